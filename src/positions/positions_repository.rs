use std::sync::Arc;

use diesel::prelude::*;
use uuid::Uuid;

use crate::db::{DbConnection, DbPool};
use crate::errors::{Error, Result};
use crate::positions::positions_model::{
    AccountPosition, AccountUpload, NewAccountPosition, NewAccountUpload, PositionRecord,
};
use crate::positions::positions_traits::PositionRepositoryTrait;
use crate::schema::{account_positions, account_uploads};

pub struct PositionRepository {
    pool: Arc<DbPool>,
}

impl PositionRepository {
    pub fn new(pool: Arc<DbPool>) -> Self {
        PositionRepository { pool }
    }

    fn conn(&self) -> Result<DbConnection> {
        self.pool.get().map_err(Error::from)
    }
}

impl PositionRepositoryTrait for PositionRepository {
    fn replace_upload(
        &self,
        user_id: &str,
        upload_type: &str,
        filename: &str,
        file_datetime: &str,
        positions: &[PositionRecord],
    ) -> Result<AccountUpload> {
        let mut conn = self.conn()?;
        let created_at = chrono::Utc::now().naive_utc();

        conn.transaction::<AccountUpload, Error, _>(|conn| {
            // Positions cascade with their upload.
            diesel::delete(
                account_uploads::table
                    .filter(account_uploads::user_id.eq(user_id))
                    .filter(account_uploads::upload_type.eq(upload_type))
                    .filter(account_uploads::filename.eq(filename)),
            )
            .execute(conn)?;

            let upload_id = Uuid::new_v4().to_string();
            let upload = diesel::insert_into(account_uploads::table)
                .values(NewAccountUpload {
                    id: &upload_id,
                    user_id,
                    file_datetime,
                    upload_type,
                    filename,
                    entry_count: positions.len() as i32,
                    created_at,
                })
                .get_result::<AccountUpload>(conn)?;

            for position in positions {
                diesel::insert_into(account_positions::table)
                    .values(NewAccountPosition {
                        id: &Uuid::new_v4().to_string(),
                        upload_id: &upload_id,
                        account_number: &position.account_number,
                        account_name: &position.account_name,
                        symbol: &position.symbol,
                        description: &position.description,
                        quantity: &position.quantity,
                        last_price: &position.last_price,
                        last_price_change: &position.last_price_change,
                        current_value: &position.current_value,
                        todays_gain_loss_dollar: &position.todays_gain_loss_dollar,
                        todays_gain_loss_percent: &position.todays_gain_loss_percent,
                        total_gain_loss_dollar: &position.total_gain_loss_dollar,
                        total_gain_loss_percent: &position.total_gain_loss_percent,
                        percent_of_account: &position.percent_of_account,
                        cost_basis_total: &position.cost_basis_total,
                        average_cost_basis: &position.average_cost_basis,
                        position_type: &position.position_type,
                    })
                    .execute(conn)?;
            }

            Ok(upload)
        })
    }

    fn load_uploads(&self, user_id: &str) -> Result<Vec<AccountUpload>> {
        let mut conn = self.conn()?;
        account_uploads::table
            .filter(account_uploads::user_id.eq(user_id))
            .order(account_uploads::created_at.desc())
            .load::<AccountUpload>(&mut conn)
            .map_err(Error::from)
    }

    fn load_positions(&self, upload_id: &str) -> Result<Vec<AccountPosition>> {
        let mut conn = self.conn()?;
        account_positions::table
            .filter(account_positions::upload_id.eq(upload_id))
            .load::<AccountPosition>(&mut conn)
            .map_err(Error::from)
    }

    fn delete_upload(&self, upload_id: &str) -> Result<usize> {
        let mut conn = self.conn()?;
        diesel::delete(account_uploads::table.find(upload_id))
            .execute(&mut conn)
            .map_err(Error::from)
    }

    fn latest_upload_for_account(
        &self,
        user_id: &str,
        account_number: &str,
    ) -> Result<Option<AccountUpload>> {
        let mut conn = self.conn()?;
        account_uploads::table
            .inner_join(account_positions::table)
            .filter(account_uploads::user_id.eq(user_id))
            .filter(account_positions::account_number.eq(account_number))
            .order(account_uploads::created_at.desc())
            .select(AccountUpload::as_select())
            .first::<AccountUpload>(&mut conn)
            .optional()
            .map_err(Error::from)
    }

    fn load_account_positions(
        &self,
        upload_id: &str,
        account_number: &str,
        symbol: &str,
    ) -> Result<Vec<AccountPosition>> {
        let mut conn = self.conn()?;
        account_positions::table
            .filter(account_positions::upload_id.eq(upload_id))
            .filter(account_positions::account_number.eq(account_number))
            .filter(account_positions::symbol.eq(symbol))
            .load::<AccountPosition>(&mut conn)
            .map_err(Error::from)
    }
}
