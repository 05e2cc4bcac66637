// src/common/id_generator.rs
//! Crockford Base32 ID Generator
//!
//! Generates prefixed record IDs using Crockford Base32 encoding.
//! Format: PREFIX_XXXXXXXXXX (e.g., IN_K7NP3XY2QM for an income entry)
//!
//! The alphabet excludes I, L, O and U, and ten random characters give
//! 32^10 combinations per record type.

use rand::Rng;

/// Crockford Base32 alphabet (excludes I, L, O, U to avoid confusion)
const CROCKFORD_ALPHABET: &[u8; 32] = b"0123456789ABCDEFGHJKMNPQRSTVWXYZ";

const ID_LENGTH: usize = 10;

/// Record type prefixes for ID generation
#[derive(Debug, Clone, Copy)]
pub enum EntityPrefix {
    /// User (U_)
    User,
    /// Expense (EX_)
    Expense,
    /// Income entry (IN_)
    Income,
    /// Loan (L_)
    Loan,
    /// Installment plan (IP_)
    Installment,
    /// Installment payment (P_)
    Payment,
}

impl EntityPrefix {
    /// Get the string prefix for this record type
    pub fn as_str(&self) -> &'static str {
        match self {
            EntityPrefix::User => "U",
            EntityPrefix::Expense => "EX",
            EntityPrefix::Income => "IN",
            EntityPrefix::Loan => "L",
            EntityPrefix::Installment => "IP",
            EntityPrefix::Payment => "P",
        }
    }
}

/// Generate a random Crockford Base32 string of specified length
fn generate_crockford_string(length: usize) -> String {
    let mut rng = rand::thread_rng();
    (0..length)
        .map(|_| {
            let idx = rng.gen_range(0..32);
            CROCKFORD_ALPHABET[idx] as char
        })
        .collect()
}

/// Generate a prefixed ID using Crockford Base32 encoding
///
/// # Example
/// ```
/// let loan_id = generate_id(EntityPrefix::Loan);
/// // Returns something like "L_K7NP3XY2QM"
/// ```
pub fn generate_id(prefix: EntityPrefix) -> String {
    format!("{}_{}", prefix.as_str(), generate_crockford_string(ID_LENGTH))
}

pub fn generate_user_id() -> String {
    generate_id(EntityPrefix::User)
}

pub fn generate_expense_id() -> String {
    generate_id(EntityPrefix::Expense)
}

pub fn generate_income_id() -> String {
    generate_id(EntityPrefix::Income)
}

pub fn generate_loan_id() -> String {
    generate_id(EntityPrefix::Loan)
}

pub fn generate_installment_id() -> String {
    generate_id(EntityPrefix::Installment)
}

pub fn generate_payment_id() -> String {
    generate_id(EntityPrefix::Payment)
}
