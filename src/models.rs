#[derive(Clone)]
pub struct AppState {
    pub db: sqlx::PgPool,
}

/* -------------------------
   Status codes
--------------------------*/

// appointment.status (smallint)
pub const APPOINTMENT_STATUS_SCHEDULED: i16 = 0;
pub const APPOINTMENT_STATUS_CONFIRMED: i16 = 1;
pub const APPOINTMENT_STATUS_COMPLETED: i16 = 2;
pub const APPOINTMENT_STATUS_CANCELLED: i16 = 3;

pub fn appointment_status_label(status: i16) -> String {
    match status {
        APPOINTMENT_STATUS_SCHEDULED => "scheduled",
        APPOINTMENT_STATUS_CONFIRMED => "confirmed",
        APPOINTMENT_STATUS_COMPLETED => "completed",
        APPOINTMENT_STATUS_CANCELLED => "cancelled",
        _ => "unknown",
    }
    .to_string()
}

/* -------------------------
   Validation helpers
--------------------------*/

/// Minimal email shape check: one '@', non-empty local part, dotted domain.
/// The booking form already runs full validation client-side; this guards
/// the patient-upsert key against garbage.
pub fn is_valid_email(s: &str) -> bool {
    let s = s.trim();
    if s.contains(char::is_whitespace) {
        return false;
    }
    let Some((local, domain)) = s.split_once('@') else {
        return false;
    };
    if local.is_empty() || domain.is_empty() {
        return false;
    }
    match domain.rsplit_once('.') {
        Some((host, tld)) => !host.is_empty() && !tld.is_empty(),
        None => false,
    }
}

// patient.gender: 0 female, 1 male, 2 other
pub fn is_valid_gender(gender: i16) -> bool {
    (0..=2).contains(&gender)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_labels() {
        assert_eq!(appointment_status_label(APPOINTMENT_STATUS_SCHEDULED), "scheduled");
        assert_eq!(appointment_status_label(APPOINTMENT_STATUS_CANCELLED), "cancelled");
        assert_eq!(appointment_status_label(99), "unknown");
    }

    #[test]
    fn email_shapes() {
        assert!(is_valid_email("jane.doe@example.co.uk"));
        assert!(is_valid_email("  padded@example.com  "));
        assert!(!is_valid_email(""));
        assert!(!is_valid_email("no-at-sign.example.com"));
        assert!(!is_valid_email("@example.com"));
        assert!(!is_valid_email("jane@"));
        assert!(!is_valid_email("jane@localhost"));
        assert!(!is_valid_email("jane doe@example.com"));
        assert!(!is_valid_email("jane@.com"));
    }

    #[test]
    fn gender_codes() {
        assert!(is_valid_gender(0));
        assert!(is_valid_gender(2));
        assert!(!is_valid_gender(-1));
        assert!(!is_valid_gender(3));
    }
}
