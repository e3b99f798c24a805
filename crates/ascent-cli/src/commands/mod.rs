//! Command implementations.

pub mod award;
pub mod breakthrough;
pub mod import;
pub mod ledger;
pub mod prime;
pub mod submission;

pub use self::award::execute_award;
pub use self::breakthrough::execute_breakthrough;
pub use self::import::execute_import;
pub use self::ledger::execute_ledger;
pub use self::prime::execute_prime;
pub use self::submission::{execute_grade, execute_submit};
