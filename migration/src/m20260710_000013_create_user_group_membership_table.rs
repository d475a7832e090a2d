use sea_orm_migration::{prelude::*, schema::*};

static IDX_USER_GROUP_MEMBERSHIP_USER_ID: &str = "idx_user_group_membership_user_id";

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(UserGroupMembership::Table)
                    .if_not_exists()
                    .col(pk_auto(UserGroupMembership::Id))
                    .col(integer(UserGroupMembership::UserId))
                    .col(string(UserGroupMembership::GroupId))
                    .col(string(UserGroupMembership::GroupName))
                    .col(boolean(UserGroupMembership::IsActive))
                    .col(timestamp(UserGroupMembership::CreatedAt))
                    .col(timestamp(UserGroupMembership::UpdatedAt))
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name(IDX_USER_GROUP_MEMBERSHIP_USER_ID)
                    .table(UserGroupMembership::Table)
                    .col(UserGroupMembership::UserId)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_index(
                Index::drop()
                    .name(IDX_USER_GROUP_MEMBERSHIP_USER_ID)
                    .table(UserGroupMembership::Table)
                    .to_owned(),
            )
            .await?;

        manager
            .drop_table(Table::drop().table(UserGroupMembership::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
pub enum UserGroupMembership {
    Table,
    Id,
    UserId,
    GroupId,
    GroupName,
    IsActive,
    CreatedAt,
    UpdatedAt,
}
