use reqwest::Url;
use serde::Serialize;
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum AuthFormError {
    #[error("{0} is required")]
    Missing(&'static str),

    #[error("Please use a Gmail address (must end with @gmail.com)")]
    NotGmail,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct LoginForm {
    pub username: String,
    pub password: String,
}

impl LoginForm {
    pub fn validate(&self) -> Result<(), AuthFormError> {
        if self.username.trim().is_empty() {
            return Err(AuthFormError::Missing("Username"));
        }
        if self.password.is_empty() {
            return Err(AuthFormError::Missing("Password"));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct SignupForm {
    pub name: String,
    pub username: String,
    pub email: String,
    pub password: String,
}

impl SignupForm {
    pub fn validate(&self) -> Result<(), AuthFormError> {
        for (label, value) in [
            ("Name", &self.name),
            ("Username", &self.username),
            ("Email", &self.email),
            ("Password", &self.password),
        ] {
            if value.trim().is_empty() {
                return Err(AuthFormError::Missing(label));
            }
        }
        if !self.email.trim().ends_with("@gmail.com") {
            return Err(AuthFormError::NotGmail);
        }
        Ok(())
    }
}

pub fn validate_email(email: &str) -> Result<(), AuthFormError> {
    if email.trim().is_empty() {
        return Err(AuthFormError::Missing("Email"));
    }
    Ok(())
}

pub fn validate_new_password(password: &str) -> Result<(), AuthFormError> {
    if password.is_empty() {
        return Err(AuthFormError::Missing("Password"));
    }
    Ok(())
}

/// Entry point of the backend's Google sign-in flow.
pub fn google_login_url(base_url: &str) -> String {
    format!("{}/api/auth/google", base_url.trim_end_matches('/'))
}

/// Pull the token out of the redirect the backend sends after OAuth,
/// e.g. `https://app.example/oauth-success?token=...`.
pub fn oauth_token_from_url(url: &str) -> Option<String> {
    let url = Url::parse(url.trim()).ok()?;
    url.query_pairs()
        .find(|(key, _)| key == "token")
        .map(|(_, value)| value.into_owned())
        .filter(|token| !token.is_empty())
}

/// Accept either the bare reset token or the whole link from the email.
pub fn reset_token_from_input(input: &str) -> Option<String> {
    let input = input.trim().trim_end_matches('/');
    if input.is_empty() {
        return None;
    }
    match input.rfind("/reset-password/") {
        Some(idx) => {
            let token = &input[idx + "/reset-password/".len()..];
            let token = token.split(['?', '#']).next().unwrap_or("");
            (!token.is_empty()).then(|| token.to_string())
        }
        None if !input.contains('/') => Some(input.to_string()),
        None => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn signup(email: &str) -> SignupForm {
        SignupForm {
            name: "Ada".into(),
            username: "ada".into(),
            email: email.into(),
            password: "hunter22".into(),
        }
    }

    #[test]
    fn test_signup_requires_gmail() {
        assert_eq!(signup("ada@gmail.com").validate(), Ok(()));
        assert_eq!(
            signup("ada@example.com").validate(),
            Err(AuthFormError::NotGmail)
        );
        assert_eq!(
            SignupForm::default().validate(),
            Err(AuthFormError::Missing("Name"))
        );
    }

    #[test]
    fn test_login_requires_both_fields() {
        let form = LoginForm {
            username: "ada".into(),
            password: String::new(),
        };
        assert_eq!(form.validate(), Err(AuthFormError::Missing("Password")));
    }

    #[test]
    fn test_oauth_token() {
        assert_eq!(
            oauth_token_from_url("http://localhost:3000/oauth-success?token=abc.def&x=1"),
            Some("abc.def".to_string())
        );
        assert_eq!(
            oauth_token_from_url("http://localhost:3000/oauth-success?token="),
            None
        );
        assert_eq!(oauth_token_from_url("not a url"), None);
    }

    #[test]
    fn test_reset_token() {
        assert_eq!(
            reset_token_from_input("https://app.example/reset-password/r3s3t?utm=x"),
            Some("r3s3t".to_string())
        );
        assert_eq!(reset_token_from_input("r3s3t"), Some("r3s3t".to_string()));
        assert_eq!(reset_token_from_input("https://app.example/other"), None);
        assert_eq!(reset_token_from_input("   "), None);
    }

    #[test]
    fn test_google_url() {
        assert_eq!(
            google_login_url("http://localhost:5000/"),
            "http://localhost:5000/api/auth/google"
        );
    }

    #[test]
    fn test_recovery_fields_required() {
        assert!(validate_new_password("").is_err());
        assert!(validate_new_password("abc").is_ok());
        assert!(validate_email(" ").is_err());
    }
}
