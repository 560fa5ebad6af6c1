use tracing::{debug, info, instrument};

use shared_database::repository::ORDER_DETAIL_SELECT;
use shared_database::DbPool;
use shared_models::error::AppError;
use shared_models::pharmacy::{Order, OrderDetail, OrderStatus, Pharmacist, Pharmacy};

use crate::models::PharmacistDashboard;

pub struct OrderService {
    pool: DbPool,
}

impl OrderService {
    pub fn new(pool: &DbPool) -> Self {
        Self { pool: pool.clone() }
    }

    pub async fn dashboard(&self, pharmacist_id: i64) -> Result<PharmacistDashboard, AppError> {
        let pharmacist = sqlx::query_as::<_, Pharmacist>(
            "SELECT id, name, pharmacy_id FROM pharmacist WHERE id = ?",
        )
        .bind(pharmacist_id)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Pharmacist {} not found", pharmacist_id)))?;

        let pharmacy = match pharmacist.pharmacy_id {
            Some(pharmacy_id) => {
                sqlx::query_as::<_, Pharmacy>("SELECT id, address, name FROM pharmacy WHERE id = ?")
                    .bind(pharmacy_id)
                    .fetch_optional(&self.pool)
                    .await?
            }
            None => None,
        };

        let pending_orders = self.pending_orders().await?;

        Ok(PharmacistDashboard {
            pharmacist,
            pharmacy,
            pending_orders,
        })
    }

    /// Scheduled orders, oldest request first.
    pub async fn pending_orders(&self) -> Result<Vec<OrderDetail>, AppError> {
        let sql = format!(
            "{} WHERE o.status = ? ORDER BY o.request_date, o.id",
            ORDER_DETAIL_SELECT
        );
        let orders = sqlx::query_as::<_, OrderDetail>(&sql)
            .bind(OrderStatus::Scheduled.as_str())
            .fetch_all(&self.pool)
            .await?;

        debug!("{} pending orders", orders.len());
        Ok(orders)
    }

    /// Scheduled -> Completed, recording who filled the order. Any other
    /// starting status is a conflict.
    #[instrument(skip(self))]
    pub async fn process_order(&self, order_id: i64, pharmacist_id: i64) -> Result<Order, AppError> {
        let updated = sqlx::query_as::<_, Order>(
            "UPDATE orders SET status = ?, pharmacist_id = ? \
             WHERE id = ? AND status = ? \
             RETURNING id, request_date, pharmacy_id, patient_id, prescript_id, pharmacist_id, status",
        )
        .bind(OrderStatus::Completed.as_str())
        .bind(pharmacist_id)
        .bind(order_id)
        .bind(OrderStatus::Scheduled.as_str())
        .fetch_optional(&self.pool)
        .await?;

        if let Some(order) = updated {
            info!("Pharmacist {} completed order {}", pharmacist_id, order_id);
            return Ok(order);
        }

        let status: Option<String> = sqlx::query_scalar("SELECT status FROM orders WHERE id = ?")
            .bind(order_id)
            .fetch_optional(&self.pool)
            .await?;

        match status {
            None => Err(AppError::NotFound(format!("Order {} not found", order_id))),
            Some(status) => Err(AppError::Conflict(format!(
                "Order {} is {} and cannot be processed",
                order_id, status
            ))),
        }
    }
}
