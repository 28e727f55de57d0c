/// The authenticated principal behind a request
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CurrentUser {
    pub id: i64,
    pub username: String,
}

/// Who is acting on a request. No credential at all is `Anonymous`;
/// a bad credential never gets this far.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Identity {
    Anonymous,
    User(CurrentUser),
}

impl Identity {
    pub fn user_id(&self) -> Option<i64> {
        match self {
            Identity::Anonymous => None,
            Identity::User(user) => Some(user.id),
        }
    }
}

/// Request-scoped values resolved by the authentication middleware
#[derive(Debug, Clone)]
pub struct RequestContext {
    pub identity: Identity,
}

impl RequestContext {
    pub fn anonymous() -> Self {
        Self {
            identity: Identity::Anonymous,
        }
    }

    pub fn for_user(id: i64, username: impl Into<String>) -> Self {
        Self {
            identity: Identity::User(CurrentUser {
                id,
                username: username.into(),
            }),
        }
    }
}
