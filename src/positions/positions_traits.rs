use std::io::Read;

use crate::errors::Result;
use crate::positions::positions_model::{AccountPosition, AccountUpload, PositionRecord};

pub trait PositionRepositoryTrait: Send + Sync {
    /// Replace any previous upload with the same (user, type, filename) and
    /// persist the new upload plus its positions in one transaction.
    fn replace_upload(
        &self,
        user_id: &str,
        upload_type: &str,
        filename: &str,
        file_datetime: &str,
        positions: &[PositionRecord],
    ) -> Result<AccountUpload>;

    fn load_uploads(&self, user_id: &str) -> Result<Vec<AccountUpload>>;
    fn load_positions(&self, upload_id: &str) -> Result<Vec<AccountPosition>>;
    fn delete_upload(&self, upload_id: &str) -> Result<usize>;

    /// Most recent upload by this user containing at least one position for
    /// the given account number.
    fn latest_upload_for_account(
        &self,
        user_id: &str,
        account_number: &str,
    ) -> Result<Option<AccountUpload>>;

    fn load_account_positions(
        &self,
        upload_id: &str,
        account_number: &str,
        symbol: &str,
    ) -> Result<Vec<AccountPosition>>;
}

pub trait PositionServiceTrait: Send + Sync {
    fn import_fidelity_positions(
        &self,
        input: &mut dyn Read,
        user_id: &str,
        filename: &str,
    ) -> Result<AccountUpload>;

    fn get_uploads(&self, user_id: &str) -> Result<Vec<AccountUpload>>;
    fn get_positions(&self, upload_id: &str) -> Result<Vec<AccountPosition>>;
    fn delete_upload(&self, upload_id: &str) -> Result<usize>;
}
