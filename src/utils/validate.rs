use once_cell::sync::Lazy;
use regex::Regex;

use crate::errors::{MaatError, Result};

static EMAIL_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[A-Za-z0-9._%+-]+@[A-Za-z0-9.-]+(\.[A-Za-z]{2,})?$").expect("Invalid email regex")
});

pub fn validate_email(email: &str) -> std::result::Result<(), &'static str> {
    // 允许 admin@localhost 这类无顶级域名的地址
    if !EMAIL_RE.is_match(email) {
        return Err("Email format is invalid");
    }
    Ok(())
}

/// 密码策略：至少 8 个字符，包含字母和数字
pub fn validate_password(password: &str) -> std::result::Result<(), String> {
    let mut errors = Vec::new();

    if password.chars().count() < 8 {
        errors.push("Password must be at least 8 characters long");
    }
    if !password.chars().any(|c| c.is_ascii_alphabetic()) {
        errors.push("Password must contain at least one letter");
    }
    if !password.chars().any(|c| c.is_ascii_digit()) {
        errors.push("Password must contain at least one digit");
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors.join("; "))
    }
}

/// 提交分数为百分制
pub fn validate_mark(mark: f64) -> Result<()> {
    if !mark.is_finite() || !(0.0..=100.0).contains(&mark) {
        return Err(MaatError::validation(format!(
            "分数必须在 0 到 100 之间，收到 {mark}"
        )));
    }
    Ok(())
}

/// 考核满分必须为正数
pub fn validate_total_mark(total_mark: f64) -> Result<()> {
    if !total_mark.is_finite() || total_mark <= 0.0 {
        return Err(MaatError::validation(format!(
            "满分必须为正数，收到 {total_mark}"
        )));
    }
    Ok(())
}

/// 校验一组邮箱，返回第一个无效的
pub fn validate_emails<'a>(emails: impl IntoIterator<Item = &'a String>) -> std::result::Result<(), String> {
    for email in emails {
        let email = email.trim();
        if !email.is_empty() && validate_email(email).is_err() {
            return Err(format!("Invalid email: {email}"));
        }
    }
    Ok(())
}
