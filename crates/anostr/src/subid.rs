use uuid::Uuid;

/// Subscription ids are random uuids so they leak nothing about the
/// client or what is being watched.
pub fn fresh_sub_id() -> String {
    Uuid::new_v4().to_string()
}
