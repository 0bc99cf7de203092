//! One-time code input for the security verification step.
//!
//! Input is sanitized as it arrives, so the buffer only ever holds up to
//! [`CODE_LENGTH`] ASCII digits. Submitting starts a short simulated
//! verification before the code is released to the caller.

use std::time::Duration;

/// Number of digits in a confirmation code
pub const CODE_LENGTH: usize = 6;

/// Keep ASCII digits only and truncate to [`CODE_LENGTH`]
pub fn sanitize(input: &str) -> String {
    input
        .chars()
        .filter(char::is_ascii_digit)
        .take(CODE_LENGTH)
        .collect()
}

/// Whether `code` is exactly [`CODE_LENGTH`] ASCII digits
pub fn is_valid_code(code: &str) -> bool {
    code.len() == CODE_LENGTH && code.bytes().all(|b| b.is_ascii_digit())
}

#[derive(Debug, Clone)]
pub struct OtpInput {
    code: String,
    verify_delay: Duration,
    /// Time the current verification began
    verifying_since: Option<Duration>,
}

impl OtpInput {
    pub fn new(verify_delay: Duration) -> Self {
        Self {
            code: String::new(),
            verify_delay,
            verifying_since: None,
        }
    }

    pub fn code(&self) -> &str {
        &self.code
    }

    pub fn is_complete(&self) -> bool {
        self.code.len() == CODE_LENGTH
    }

    pub fn is_verifying(&self) -> bool {
        self.verifying_since.is_some()
    }

    /// Submit is enabled once the code is complete and no verification is underway
    pub fn can_submit(&self) -> bool {
        self.is_complete() && !self.is_verifying()
    }

    /// Add one typed character. Non-digits and overflow are dropped.
    pub fn push(&mut self, c: char) {
        if self.is_verifying() || !c.is_ascii_digit() || self.is_complete() {
            return;
        }
        self.code.push(c);
    }

    /// Append pasted text, sanitized
    pub fn paste(&mut self, text: &str) {
        if self.is_verifying() {
            return;
        }
        let combined = format!("{}{}", self.code, text);
        self.code = sanitize(&combined);
    }

    pub fn backspace(&mut self) {
        if !self.is_verifying() {
            self.code.pop();
        }
    }

    pub fn clear(&mut self) {
        self.code.clear();
        self.verifying_since = None;
    }

    /// Begin verification. Returns false if submit is not currently enabled.
    pub fn submit(&mut self, now: Duration) -> bool {
        if !self.can_submit() {
            return false;
        }
        self.verifying_since = Some(now);
        true
    }

    /// Release the code once the verification delay has passed
    pub fn poll(&mut self, now: Duration) -> Option<String> {
        let since = self.verifying_since?;
        if now.saturating_sub(since) < self.verify_delay {
            return None;
        }
        self.verifying_since = None;
        Some(std::mem::take(&mut self.code))
    }

    /// Request a new code. Delivery is simulated, so nothing is sent.
    pub fn resend(&self) {
        tracing::debug!("OTP resend requested (no delivery channel)");
    }
}
