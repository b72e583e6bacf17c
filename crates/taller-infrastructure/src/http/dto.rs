//! Wire shapes of the REST endpoints that do not map 1:1 onto domain types.

use serde::{Deserialize, Serialize};
use taller_core::session::{Identity, SessionCheck, UserId};

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct UserDto {
    pub id: UserId,
    #[serde(alias = "name", alias = "username")]
    pub display_name: String,
    #[serde(default)]
    pub role: String,
}

impl From<UserDto> for Identity {
    fn from(dto: UserDto) -> Self {
        Identity {
            id: dto.id,
            display_name: dto.display_name,
            role: dto.role,
        }
    }
}

/// `GET /auth/check-auth`
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct CheckAuthResponse {
    pub is_authenticated: bool,
    #[serde(default)]
    pub user: Option<UserDto>,
}

impl From<CheckAuthResponse> for SessionCheck {
    fn from(dto: CheckAuthResponse) -> Self {
        SessionCheck {
            is_authenticated: dto.is_authenticated,
            user: dto.user.map(Identity::from),
        }
    }
}

/// `POST /auth/login`
#[derive(Debug, Deserialize)]
pub(crate) struct LoginResponse {
    pub user: UserDto,
}

/// `PUT /notifications/{id}`
#[derive(Debug, Serialize)]
pub(crate) struct MarkReadRequest {
    pub read: bool,
}

/// Error body some endpoints return alongside a non-2xx status.
#[derive(Debug, Deserialize)]
pub(crate) struct ErrorBody {
    #[serde(alias = "error")]
    pub message: String,
}
