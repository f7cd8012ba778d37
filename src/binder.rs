//! Partial argument binding against a declared parameter signature.
//!
//! External payloads (webhook bodies, raw documents written by other services)
//! routinely carry more fields than a record type declares. Rather than reject
//! them, construction goes through [`bind`]: walk the type's declared
//! parameters in order, keep every supplied argument a parameter claims, and
//! silently drop the rest. A record that needs two fields out of a
//! hundred-field payload still constructs, with the two it declared.
//!
//! Signatures are declared statically per record type (see
//! [`Record::signature`](crate::Record::signature)) — an ordered table of
//! [`ParamSpec`]s over the five [`ParamKind`]s — and validated once at
//! construction, so a malformed declaration fails at registration time, not
//! per payload.

use crate::error::{StoreError, StoreResult};
use serde_json::{Map, Value};

/// How a declared parameter accepts arguments.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParamKind {
    /// Bound only from the positional bundle, by index.
    PositionalOnly,
    /// Bound only from the named bundle, by name.
    NamedOnly,
    /// Bound positionally if an argument exists at this index, otherwise by
    /// name. A positional match also claims the same-named entry so the two
    /// bundles never bind the same parameter twice.
    PositionalOrNamed,
    /// Claims all remaining positional arguments.
    VariadicPositional,
    /// Claims all remaining named arguments.
    VariadicNamed,
}

/// One declared parameter: a name and how it binds.
#[derive(Debug, Clone)]
pub struct ParamSpec {
    pub name: &'static str,
    pub kind: ParamKind,
}

impl ParamSpec {
    pub const fn new(name: &'static str, kind: ParamKind) -> Self {
        ParamSpec { name, kind }
    }

    /// Shorthand for the common positional-or-named case.
    pub const fn field(name: &'static str) -> Self {
        ParamSpec::new(name, ParamKind::PositionalOrNamed)
    }

    /// Shorthand for a named-only parameter.
    pub const fn named(name: &'static str) -> Self {
        ParamSpec::new(name, ParamKind::NamedOnly)
    }
}

/// An ordered, validated parameter table for one constructor.
#[derive(Debug, Clone)]
pub struct Signature {
    params: Vec<ParamSpec>,
}

impl Signature {
    /// Validate and build a signature.
    ///
    /// Fails with [`StoreError::Binding`] when the declaration is not well
    /// formed: a duplicate parameter name, more than one variadic on the same
    /// axis, or a parameter declared after the variadic that would already
    /// have claimed it.
    pub fn new(params: Vec<ParamSpec>) -> StoreResult<Self> {
        let mut seen_names = std::collections::HashSet::new();
        let mut saw_var_positional = false;
        let mut saw_var_named = false;

        for p in &params {
            if !seen_names.insert(p.name) {
                return Err(StoreError::Binding(format!(
                    "duplicate parameter `{}`",
                    p.name
                )));
            }
            match p.kind {
                ParamKind::PositionalOnly | ParamKind::PositionalOrNamed => {
                    if saw_var_positional {
                        return Err(StoreError::Binding(format!(
                            "positional parameter `{}` after a variadic-positional",
                            p.name
                        )));
                    }
                    if saw_var_named {
                        return Err(StoreError::Binding(format!(
                            "parameter `{}` after a variadic-named",
                            p.name
                        )));
                    }
                }
                ParamKind::NamedOnly => {
                    if saw_var_named {
                        return Err(StoreError::Binding(format!(
                            "parameter `{}` after a variadic-named",
                            p.name
                        )));
                    }
                }
                ParamKind::VariadicPositional => {
                    if saw_var_positional {
                        return Err(StoreError::Binding(
                            "more than one variadic-positional parameter".to_string(),
                        ));
                    }
                    saw_var_positional = true;
                }
                ParamKind::VariadicNamed => {
                    if saw_var_named {
                        return Err(StoreError::Binding(
                            "more than one variadic-named parameter".to_string(),
                        ));
                    }
                    saw_var_named = true;
                }
            }
        }

        Ok(Signature { params })
    }

    pub fn params(&self) -> &[ParamSpec] {
        &self.params
    }
}

/// Arguments accepted by a [`bind`] walk.
///
/// Positional arguments keep their original relative order; named arguments
/// keep their original keys.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BoundArgs {
    pub positional: Vec<Value>,
    pub named: Map<String, Value>,
}

/// Bind a supplied argument bundle against a declared signature.
///
/// Declared parameters are walked in order. Each claims arguments per its
/// [`ParamKind`]; anything no parameter claims is silently discarded. The walk
/// never fails for well-formed signatures — tolerance of oversized payloads is
/// the whole point.
///
/// # Examples
///
/// ```rust
/// use docstore::binder::{bind, ParamKind, ParamSpec, Signature};
/// use serde_json::json;
///
/// let sig = Signature::new(vec![
///     ParamSpec::field("a"),
///     ParamSpec::named("b"),
///     ParamSpec::new("rest", ParamKind::VariadicNamed),
/// ])
/// .unwrap();
///
/// let named = [
///     ("b".to_string(), json!("y")),
///     ("c".to_string(), json!("z")),
/// ]
/// .into_iter()
/// .collect();
///
/// let bound = bind(&sig, vec![json!("x")], named);
/// assert_eq!(bound.positional, vec![json!("x")]);
/// assert_eq!(bound.named.len(), 2); // b claimed by name, c by the variadic
/// ```
pub fn bind(
    signature: &Signature,
    positional: Vec<Value>,
    mut named: Map<String, Value>,
) -> BoundArgs {
    let mut accepted = BoundArgs::default();
    // Index into the positional bundle; advances independently of the walk so
    // named-only parameters don't consume a slot.
    let mut pos_index = 0usize;

    for spec in signature.params() {
        match spec.kind {
            ParamKind::PositionalOnly => {
                if pos_index < positional.len() {
                    accepted.positional.push(positional[pos_index].clone());
                }
                pos_index += 1;
            }
            ParamKind::NamedOnly => {
                if let Some(value) = named.remove(spec.name) {
                    accepted.named.insert(spec.name.to_string(), value);
                }
            }
            ParamKind::PositionalOrNamed => {
                if pos_index < positional.len() {
                    accepted.positional.push(positional[pos_index].clone());
                    // Drop a same-named entry so a later variadic-named
                    // cannot bind this parameter a second time.
                    named.remove(spec.name);
                } else if let Some(value) = named.remove(spec.name) {
                    accepted.named.insert(spec.name.to_string(), value);
                }
                pos_index += 1;
            }
            ParamKind::VariadicPositional => {
                accepted
                    .positional
                    .extend(positional.iter().skip(pos_index).cloned());
                pos_index = positional.len();
            }
            ParamKind::VariadicNamed => {
                accepted.named.append(&mut named);
            }
        }
    }

    accepted
}
