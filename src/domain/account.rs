use serde::Serialize;

pub type AccountId = i64;

/// A registered user identity.
///
/// The login is unique across the store and never changes after
/// registration. The credential is kept verbatim and compared by equality.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Account {
    pub id: AccountId,
    pub login: String,
    #[serde(skip_serializing)]
    pub credential: String,
}
