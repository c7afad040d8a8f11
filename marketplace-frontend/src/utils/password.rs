#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PasswordStrength {
    /// 0 to 4.
    pub score: u8,
    pub label: &'static str,
}

/// One point each for length of at least 8, mixed case, a digit and a symbol.
pub fn password_strength(password: &str) -> PasswordStrength {
    let checks = [
        password.chars().count() >= 8,
        password.chars().any(char::is_lowercase) && password.chars().any(char::is_uppercase),
        password.chars().any(|c| c.is_ascii_digit()),
        password.chars().any(|c| !c.is_alphanumeric() && !c.is_whitespace()),
    ];
    let score = checks.iter().filter(|passed| **passed).count() as u8;

    let label = match score {
        0 | 1 => "Weak",
        2 => "Fair",
        3 => "Good",
        _ => "Strong",
    };

    PasswordStrength { score, label }
}
