//! Local checks run before anything is sent to the backend.

use thiserror::Error;

use crate::api::types::{LoginRequest, RegisterRequest, ReportRequest, ReportType, StickerToRealityRequest};

pub const REPORT_REASON_MAX: usize = 500;
pub const STICKER_MAX_SECONDS: f64 = 10.0;

#[derive(Debug, Error, PartialEq)]
pub enum ValidationError {
    #[error("{0} is required")]
    Required(&'static str),
    #[error("passwords do not match")]
    PasswordMismatch,
    #[error("`{0}` is not a valid e-mail address")]
    InvalidEmail(String),
    #[error("a report needs exactly one target, got {0}")]
    ReportTarget(usize),
    #[error("report reason is {0} characters, the limit is 500")]
    ReasonTooLong(usize),
    #[error("sticker range {start}s..{end}s must be longer than 0s and at most 10s")]
    StickerRange { start: f64, end: f64 },
}

fn required(value: &str, field: &'static str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        Err(ValidationError::Required(field))
    } else {
        Ok(())
    }
}

/// Something before `@` and a dot inside the domain part.
pub fn is_plausible_email(email: &str) -> bool {
    match email.trim().split_once('@') {
        Some((local, domain)) => {
            !local.is_empty() && !domain.contains('@') && domain.split('.').count() >= 2 && domain.split('.').all(|p| !p.is_empty())
        }
        None => false,
    }
}

fn email(value: &str) -> Result<(), ValidationError> {
    required(value, "email")?;
    if is_plausible_email(value) {
        Ok(())
    } else {
        Err(ValidationError::InvalidEmail(value.trim().to_string()))
    }
}

#[derive(Clone, Debug, Default)]
pub struct LoginForm {
    pub email: String,
    pub password: String,
}

impl LoginForm {
    pub fn validate(&self) -> Result<LoginRequest, ValidationError> {
        email(&self.email)?;
        required(&self.password, "password")?;
        Ok(LoginRequest { email: self.email.trim().to_string(), password: self.password.clone() })
    }
}

#[derive(Clone, Debug, Default)]
pub struct RegisterForm {
    pub username: String,
    pub email: String,
    pub password: String,
    pub confirm_password: String,
}

impl RegisterForm {
    pub fn validate(&self) -> Result<RegisterRequest, ValidationError> {
        required(&self.username, "username")?;
        email(&self.email)?;
        required(&self.password, "password")?;
        if self.password != self.confirm_password {
            return Err(ValidationError::PasswordMismatch);
        }
        Ok(RegisterRequest {
            username: self.username.trim().to_string(),
            email: self.email.trim().to_string(),
            password: self.password.clone(),
        })
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ReportTarget {
    User(String),
    Video(String),
    Comment(String),
}

/// Builds a report for a single target.
pub fn report(target: ReportTarget, report_type: ReportType, reason: Option<String>) -> Result<ReportRequest, ValidationError> {
    let mut req = ReportRequest { reported_user_id: None, reported_video_id: None, reported_comment_id: None, report_type, reason };
    match target {
        ReportTarget::User(id) => req.reported_user_id = Some(id),
        ReportTarget::Video(id) => req.reported_video_id = Some(id),
        ReportTarget::Comment(id) => req.reported_comment_id = Some(id),
    }
    check_report(&req)?;
    Ok(req)
}

pub fn check_report(req: &ReportRequest) -> Result<(), ValidationError> {
    let targets = [&req.reported_user_id, &req.reported_video_id, &req.reported_comment_id].iter().filter(|t| t.is_some()).count();
    if targets != 1 {
        return Err(ValidationError::ReportTarget(targets));
    }
    if let Some(len) = req.reason.as_ref().map(|r| r.chars().count()).filter(|&len| len > REPORT_REASON_MAX) {
        return Err(ValidationError::ReasonTooLong(len));
    }
    Ok(())
}

pub fn check_sticker_range(req: &StickerToRealityRequest) -> Result<(), ValidationError> {
    let span = req.end_time - req.start_time;
    if span > 0.0 && span <= STICKER_MAX_SECONDS {
        Ok(())
    } else {
        Err(ValidationError::StickerRange { start: req.start_time, end: req.end_time })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn register(password: &str, confirm: &str) -> RegisterForm {
        RegisterForm { username: "mina".into(), email: "mina@lokiz.com".into(), password: password.into(), confirm_password: confirm.into() }
    }

    #[test]
    fn email_shape() {
        for ok in ["a@b.co", " mina@lokiz.com ", "x.y@mail.example.org"] {
            assert!(is_plausible_email(ok), "{ok}");
        }
        for bad in ["", "mina", "@lokiz.com", "mina@lokiz", "mina@.com", "mina@lokiz.", "a@b@c.com"] {
            assert!(!is_plausible_email(bad), "{bad}");
        }
    }

    #[test]
    fn register_requires_matching_passwords() {
        assert_eq!(register("secret", "secret!").validate().unwrap_err(), ValidationError::PasswordMismatch);
        assert_eq!(register("secret", "secret").validate().unwrap().username, "mina");
    }

    #[test]
    fn blank_fields_are_required() {
        let form = RegisterForm { username: "  ".into(), ..register("a", "a") };
        assert_eq!(form.validate().unwrap_err(), ValidationError::Required("username"));
        let login = LoginForm { email: "mina@lokiz.com".into(), password: String::new() };
        assert_eq!(login.validate().unwrap_err(), ValidationError::Required("password"));
    }

    #[test]
    fn report_limits() {
        assert!(report(ReportTarget::Video("v".into()), ReportType::Spam, Some("x".repeat(500))).is_ok());
        assert_eq!(
            report(ReportTarget::User("u".into()), ReportType::Other, Some("x".repeat(501))).unwrap_err(),
            ValidationError::ReasonTooLong(501)
        );
        let mut req = report(ReportTarget::Comment("c".into()), ReportType::Harassment, None).unwrap();
        req.reported_video_id = Some("v".into());
        assert_eq!(check_report(&req).unwrap_err(), ValidationError::ReportTarget(2));
    }

    #[test]
    fn sticker_range_bounds() {
        let mut req = StickerToRealityRequest {
            video_id: "v".into(),
            user_image_url: "https://img".into(),
            start_time: 2.0,
            end_time: 12.0,
            prompt: "wave".into(),
            is_glitch: false,
        };
        assert!(check_sticker_range(&req).is_ok());
        req.end_time = 12.5;
        assert!(check_sticker_range(&req).is_err());
        req.end_time = 2.0;
        assert!(check_sticker_range(&req).is_err());
    }
}
