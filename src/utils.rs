use serde::{Deserialize, Serialize};

/// Acknowledgement for operations that have nothing else to return.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SuccessBody {
    pub status: String,
}

impl SuccessBody {
    pub fn ok() -> SuccessBody {
        SuccessBody {
            status: "OK".to_string(),
        }
    }
}
