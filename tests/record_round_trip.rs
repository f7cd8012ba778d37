//! End-to-end: typed records moving through the store inside transactions.

use docstore::binder::{ParamSpec, Signature};
use docstore::{
    from_snapshot, resolve, to_document, with_transaction, MemoryStore, Metadata, Record,
    StoreClient, StoreError, METADATA_KEY,
};
use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use serde_json::json;

#[derive(Debug, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
struct Member {
    #[serde(rename = "_metadata", default)]
    metadata: Metadata,
    name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    email: Option<String>,
}

static MEMBER_SIGNATURE: Lazy<Signature> = Lazy::new(|| {
    Signature::new(vec![
        ParamSpec::named(METADATA_KEY),
        ParamSpec::field("name"),
        ParamSpec::field("email"),
    ])
    .expect("well-formed declaration")
});

impl Record for Member {
    fn signature() -> &'static Signature {
        &MEMBER_SIGNATURE
    }
    fn metadata(&self) -> &Metadata {
        &self.metadata
    }
    fn metadata_mut(&mut self) -> &mut Metadata {
        &mut self.metadata
    }
}

fn seed(store: &MemoryStore, path: &str, fields: serde_json::Value) {
    let serde_json::Value::Object(map) = fields else {
        panic!("seed fields must be an object")
    };
    store.set_document(&resolve(path).unwrap(), map).unwrap();
}

#[test]
fn read_modify_write_inside_a_scope() {
    let store = MemoryStore::new();
    seed(&store, "members/m-1", json!({"name": "Ada"}));
    let at = resolve("members/m-1").unwrap();

    with_transaction(&store, |tx| {
        let snap = store.get_document(&at)?.expect("seeded");
        let mut member: Member = from_snapshot(&snap)?;
        member.email = Some("ada@example.com".to_string());
        tx.set(member.doc_ref()?.clone(), to_document(&mut member)?);
        store.commit_transaction(tx)
    })
    .unwrap();

    let snap = store.get_document(&at).unwrap().expect("committed");
    let reread: Member = from_snapshot(&snap).unwrap();
    assert_eq!(reread.email.as_deref(), Some("ada@example.com"));
    assert_eq!(reread.uid().unwrap(), "m-1");
}

#[test]
fn oversized_webhook_payload_maps_onto_a_small_record() {
    let store = MemoryStore::new();
    seed(
        &store,
        "members/m-2",
        json!({
            "name": "Grace",
            "plan": "enterprise",
            "seats": 250,
            "billing": {"cycle": "annual"},
            "tags": ["a", "b"]
        }),
    );

    let snap = store
        .get_document(&resolve("members/m-2").unwrap())
        .unwrap()
        .expect("seeded");
    let member: Member = from_snapshot(&snap).unwrap();
    assert_eq!(member.name, "Grace");
    assert_eq!(member.uid().unwrap(), "m-2");
}

#[test]
fn uid_survives_a_full_write_read_cycle() {
    let store = MemoryStore::new();
    seed(&store, "members/m-3", json!({"name": "Ada"}));
    let at = resolve("members/m-3").unwrap();

    let snap = store.get_document(&at).unwrap().expect("seeded");
    let mut member: Member = from_snapshot(&snap).unwrap();
    let uid = member.uid().unwrap().to_string();
    let created = member.metadata().created_time();

    store.set_document(&at, to_document(&mut member).unwrap()).unwrap();

    let snap = store.get_document(&at).unwrap().expect("rewritten");
    let reread: Member = from_snapshot(&snap).unwrap();
    assert_eq!(reread.uid().unwrap(), uid);
    assert_eq!(reread.metadata().created_time(), created);
    assert!(reread.metadata().updated_time() >= created);
}

#[test]
fn unsaved_record_refuses_to_name_itself() {
    let member = Member {
        metadata: Metadata::default(),
        name: "nobody".to_string(),
        email: None,
    };
    assert!(matches!(member.uid(), Err(StoreError::NoPath { .. })));
}
