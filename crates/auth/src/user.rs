//! User accounts and account-age reporting.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use twotails_core::{DomainError, DomainResult, Entity, RoleId, UserId, validate_email, validate_text};

const MAX_USERNAME_CHARS: usize = 150;
const DAYS_PER_YEAR: u64 = 365;

// ─────────────────────────────────────────────────────────────────────────────
// Account age
// ─────────────────────────────────────────────────────────────────────────────

/// Time a user has held an account, split into 365-day years and leftover days.
///
/// Leap years are deliberately ignored.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccountAge {
    pub years: u64,
    pub days: u64,
}

impl AccountAge {
    /// Negative spans (join timestamp in the future) clamp to zero.
    pub fn from_elapsed_days(days: i64) -> Self {
        let total = u64::try_from(days).unwrap_or(0);
        Self {
            years: total / DAYS_PER_YEAR,
            days: total % DAYS_PER_YEAR,
        }
    }

    /// Whole days elapsed from `joined` to `now`.
    pub fn between(joined: DateTime<Utc>, now: DateTime<Utc>) -> Self {
        Self::from_elapsed_days((now - joined).num_days())
    }
}

impl core::fmt::Display for AccountAge {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "{} лет и {} дней", self.years, self.days)
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// User
// ─────────────────────────────────────────────────────────────────────────────

/// Input for registering a user account.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateUser {
    pub user_id: UserId,
    /// Falls back to the configured default role when `None`.
    pub role_id: Option<RoleId>,
    pub username: String,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub is_staff: bool,
    pub occurred_at: DateTime<Utc>,
}

/// User account.
///
/// # Invariants
/// - Every user holds exactly one role.
/// - `username` is non-empty (uniqueness is enforced by the store).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    id: UserId,
    role_id: RoleId,
    username: String,
    first_name: String,
    last_name: String,
    email: String,
    is_staff: bool,
    is_active: bool,
    date_joined: DateTime<Utc>,
}

impl User {
    /// Build a user from a create command once the role has been resolved.
    pub fn register(cmd: &CreateUser, role_id: RoleId) -> DomainResult<Self> {
        let username = cmd.username.trim();
        validate_text("username", username, MAX_USERNAME_CHARS)?;
        if username.chars().any(char::is_whitespace) {
            return Err(DomainError::validation("username cannot contain whitespace"));
        }
        if !cmd.email.trim().is_empty() {
            validate_email(&cmd.email)?;
        }

        Ok(Self {
            id: cmd.user_id,
            role_id,
            username: username.to_string(),
            first_name: cmd.first_name.trim().to_string(),
            last_name: cmd.last_name.trim().to_string(),
            email: cmd.email.trim().to_lowercase(),
            is_staff: cmd.is_staff,
            is_active: true,
            date_joined: cmd.occurred_at,
        })
    }

    pub fn role_id(&self) -> RoleId {
        self.role_id
    }

    pub fn username(&self) -> &str {
        &self.username
    }

    pub fn first_name(&self) -> &str {
        &self.first_name
    }

    pub fn last_name(&self) -> &str {
        &self.last_name
    }

    pub fn email(&self) -> &str {
        &self.email
    }

    pub fn is_staff(&self) -> bool {
        self.is_staff
    }

    pub fn is_active(&self) -> bool {
        self.is_active
    }

    pub fn date_joined(&self) -> DateTime<Utc> {
        self.date_joined
    }

    pub fn assign_role(&mut self, role_id: RoleId) {
        self.role_id = role_id;
    }

    pub fn set_active(&mut self, active: bool) {
        self.is_active = active;
    }

    pub fn account_age(&self, now: DateTime<Utc>) -> AccountAge {
        AccountAge::between(self.date_joined, now)
    }

    /// Case-insensitive match against username, email and names.
    pub fn matches(&self, needle: &str) -> bool {
        let needle = needle.to_lowercase();
        [&self.username, &self.email, &self.first_name, &self.last_name]
            .iter()
            .any(|field| field.to_lowercase().contains(&needle))
    }
}

impl Entity for User {
    type Id = UserId;
    const NAME: &'static str = "user";

    fn id(&self) -> &UserId {
        &self.id
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;
    use proptest::prelude::*;

    fn create_cmd(username: &str, email: &str) -> CreateUser {
        CreateUser {
            user_id: UserId::new(),
            role_id: None,
            username: username.to_string(),
            first_name: "Анна".to_string(),
            last_name: "Иванова".to_string(),
            email: email.to_string(),
            is_staff: false,
            occurred_at: Utc::now(),
        }
    }

    #[test]
    fn account_age_two_years_and_ten_days() {
        let now = Utc::now();
        let joined = now - Duration::days(2 * 365 + 10);
        assert_eq!(AccountAge::between(joined, now).to_string(), "2 лет и 10 дней");
    }

    #[test]
    fn account_age_ignores_partial_days() {
        let now = Utc::now();
        let joined = now - Duration::days(3) - Duration::hours(23);
        assert_eq!(AccountAge::between(joined, now), AccountAge { years: 0, days: 3 });
    }

    #[test]
    fn account_age_clamps_future_join_to_zero() {
        let now = Utc::now();
        let joined = now + Duration::days(40);
        assert_eq!(AccountAge::between(joined, now).to_string(), "0 лет и 0 дней");
    }

    #[test]
    fn register_normalizes_email_and_keeps_role() {
        let role = RoleId::new();
        let user = User::register(&create_cmd("anna", " Anna@Shop.RU "), role).unwrap();
        assert_eq!(user.email(), "anna@shop.ru");
        assert_eq!(user.role_id(), role);
        assert!(user.is_active());
    }

    #[test]
    fn register_rejects_bad_username_or_email() {
        let role = RoleId::new();
        assert!(User::register(&create_cmd("  ", ""), role).is_err());
        assert!(User::register(&create_cmd("two words", ""), role).is_err());
        assert!(User::register(&create_cmd("anna", "not-an-email"), role).is_err());
        assert!(User::register(&create_cmd("anna", ""), role).is_ok());
    }

    #[test]
    fn matches_searches_names_and_email() {
        let user = User::register(&create_cmd("anna", "anna@shop.ru"), RoleId::new()).unwrap();
        assert!(user.matches("ИВАН"));
        assert!(user.matches("shop.ru"));
        assert!(!user.matches("petrov"));
    }

    proptest! {
        /// Property: years * 365 + days reconstructs the elapsed day count.
        #[test]
        fn account_age_decomposes_elapsed_days(days in 0i64..200_000) {
            let age = AccountAge::from_elapsed_days(days);
            prop_assert!(age.days < 365);
            prop_assert_eq!(age.years * 365 + age.days, days as u64);
        }
    }
}
