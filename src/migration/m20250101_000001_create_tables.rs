use sea_orm::{EntityTrait, Schema};
use sea_orm_migration::prelude::*;

use crate::entity::{AuditLogs, CartLines, Events, OrderLines, Orders, Services, Users, cart_lines};

#[derive(DeriveMigrationName)]
pub struct Migration;

impl Migration {
    async fn create<E: EntityTrait>(manager: &SchemaManager<'_>, entity: E) -> Result<(), DbErr> {
        let schema = Schema::new(manager.get_database_backend());
        manager
            .create_table(schema.create_table_from_entity(entity).if_not_exists().to_owned())
            .await
    }
}

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        // Parents before children so foreign keys resolve on Postgres.
        Self::create(manager, Users).await?;
        Self::create(manager, Events).await?;
        Self::create(manager, Services).await?;
        Self::create(manager, CartLines).await?;
        Self::create(manager, Orders).await?;
        Self::create(manager, OrderLines).await?;
        Self::create(manager, AuditLogs).await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_cart_lines_user_service")
                    .table(CartLines)
                    .col(cart_lines::Column::UserId)
                    .col(cart_lines::Column::ServiceId)
                    .unique()
                    .if_not_exists()
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_index(Index::drop().name("idx_cart_lines_user_service").table(CartLines).to_owned())
            .await?;
        manager.drop_table(Table::drop().table(AuditLogs).if_exists().to_owned()).await?;
        manager.drop_table(Table::drop().table(OrderLines).if_exists().to_owned()).await?;
        manager.drop_table(Table::drop().table(Orders).if_exists().to_owned()).await?;
        manager.drop_table(Table::drop().table(CartLines).if_exists().to_owned()).await?;
        manager.drop_table(Table::drop().table(Services).if_exists().to_owned()).await?;
        manager.drop_table(Table::drop().table(Events).if_exists().to_owned()).await?;
        manager.drop_table(Table::drop().table(Users).if_exists().to_owned()).await
    }
}
