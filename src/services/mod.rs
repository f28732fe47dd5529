pub mod ops_service;

pub use ops_service::OpsService;

/// Outcome of an account-scoped read.
///
/// `Disabled` means the caller has no account selected: no network call
/// was issued and there is no data. It is distinct from `Ready` with an
/// empty vector, which is a real (empty) result.
#[derive(Debug, Clone, PartialEq)]
pub enum QueryData<T> {
    Disabled,
    Ready(T),
}

impl<T> QueryData<T> {
    pub fn is_disabled(&self) -> bool {
        matches!(self, QueryData::Disabled)
    }

    pub fn into_option(self) -> Option<T> {
        match self {
            QueryData::Disabled => None,
            QueryData::Ready(value) => Some(value),
        }
    }

    pub fn as_ref(&self) -> QueryData<&T> {
        match self {
            QueryData::Disabled => QueryData::Disabled,
            QueryData::Ready(value) => QueryData::Ready(value),
        }
    }
}

impl<T: Default> QueryData<T> {
    pub fn unwrap_or_default(self) -> T {
        self.into_option().unwrap_or_default()
    }
}
