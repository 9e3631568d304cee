use serde::{Deserialize, Serialize};
use validator::Validate;

use super::user::UserResponse;

/// Login request; the shape depends on the sign-in method
#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "method", rename_all = "lowercase")]
pub enum LoginRequest {
    Email { email: String, password: String },
    Google { assertion: String },
    Facebook { assertion: String },
}

#[derive(Debug, Clone, Serialize)]
pub struct LoginResponse {
    pub access_token: String,
    pub refresh_token: String,
    pub otp_verified: bool,
    pub user: UserResponse,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RefreshRequest {
    pub refresh_token: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct AccessTokenResponse {
    pub access_token: String,
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct VerifyOtpRequest {
    #[validate(length(equal = 6, message = "OTP must be 6 digits"))]
    pub otp: String,
}

/// Outcome of a successful OTP check
#[derive(Debug, Clone, Serialize)]
#[serde(untagged)]
pub enum VerifyOtpResponse {
    /// Account verification; fresh tokens carry the verified flag
    Verified {
        message: String,
        access_token: String,
        refresh_token: String,
    },
    /// Forgot-password flow; a password reset is now allowed
    ResetAllowed { message: String },
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct ChangePasswordRequest {
    pub old_password: String,
    #[validate(length(min = 6, message = "Password must be at least 6 characters"))]
    pub new_password: String,
    pub confirm_password: String,
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct ForgotPasswordRequest {
    #[validate(email)]
    pub email: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct ForgotPasswordResponse {
    pub message: String,
    pub reset_token: String,
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct ResetPasswordRequest {
    #[validate(length(min = 6, message = "Password must be at least 6 characters"))]
    pub new_password: String,
    pub confirm_password: String,
}

/// Plain `{message}` acknowledgement
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MessageResponse {
    pub message: String,
}

impl MessageResponse {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_login_request_is_tagged_by_method() {
        let req: LoginRequest =
            serde_json::from_str(r#"{"method":"email","email":"a@b.c","password":"x"}"#).unwrap();
        assert!(matches!(req, LoginRequest::Email { .. }));

        let req: LoginRequest =
            serde_json::from_str(r#"{"method":"google","assertion":"tok"}"#).unwrap();
        assert!(matches!(req, LoginRequest::Google { .. }));

        assert!(serde_json::from_str::<LoginRequest>(r#"{"method":"twitter"}"#).is_err());
    }

    #[test]
    fn test_otp_length_is_validated() {
        let req = VerifyOtpRequest {
            otp: "123".to_string(),
        };
        assert!(req.validate().is_err());
    }
}
