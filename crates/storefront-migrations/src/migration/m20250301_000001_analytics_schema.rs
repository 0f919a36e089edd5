//! Websites and the tracking tables hanging off them

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Websites::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Websites::Id)
                            .integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Websites::Name).string().not_null())
                    .col(ColumnDef::new(Websites::Domain).string().not_null())
                    .col(
                        ColumnDef::new(Websites::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(UserSessions::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(UserSessions::Id)
                            .big_integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(UserSessions::SessionId).string_len(64).not_null())
                    .col(ColumnDef::new(UserSessions::WebsiteId).integer().not_null())
                    .col(ColumnDef::new(UserSessions::Browser).string().null())
                    .col(ColumnDef::new(UserSessions::Os).string().null())
                    .col(ColumnDef::new(UserSessions::Device).string().null())
                    .col(ColumnDef::new(UserSessions::DistinctId).string().null())
                    .col(ColumnDef::new(UserSessions::Country).string_len(8).null())
                    .col(ColumnDef::new(UserSessions::Region).string().null())
                    .col(ColumnDef::new(UserSessions::City).string().null())
                    .col(ColumnDef::new(UserSessions::Language).string_len(35).null())
                    .col(ColumnDef::new(UserSessions::Screen).string_len(32).null())
                    .col(
                        ColumnDef::new(UserSessions::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_user_sessions_website")
                            .from(UserSessions::Table, UserSessions::WebsiteId)
                            .to(Websites::Table, Websites::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        // Session lookup by hash inside the dedup window
        manager
            .create_index(
                Index::create()
                    .name("idx_user_sessions_lookup")
                    .table(UserSessions::Table)
                    .col(UserSessions::SessionId)
                    .col(UserSessions::CreatedAt)
                    .if_not_exists()
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_user_sessions_website_created")
                    .table(UserSessions::Table)
                    .col(UserSessions::WebsiteId)
                    .col(UserSessions::CreatedAt)
                    .if_not_exists()
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(PageViews::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(PageViews::Id)
                            .big_integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(PageViews::SessionId).big_integer().not_null())
                    .col(ColumnDef::new(PageViews::WebsiteId).integer().not_null())
                    .col(ColumnDef::new(PageViews::UrlPath).text().not_null())
                    .col(ColumnDef::new(PageViews::UrlQuery).text().null())
                    .col(ColumnDef::new(PageViews::PageTitle).text().null())
                    .col(ColumnDef::new(PageViews::ReferrerPath).text().null())
                    .col(ColumnDef::new(PageViews::ReferrerQuery).text().null())
                    .col(ColumnDef::new(PageViews::ReferrerDomain).string().null())
                    .col(ColumnDef::new(PageViews::UtmSource).string().null())
                    .col(ColumnDef::new(PageViews::UtmMedium).string().null())
                    .col(ColumnDef::new(PageViews::UtmCampaign).string().null())
                    .col(ColumnDef::new(PageViews::UtmContent).string().null())
                    .col(ColumnDef::new(PageViews::UtmTerm).string().null())
                    .col(
                        ColumnDef::new(PageViews::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_page_views_website")
                            .from(PageViews::Table, PageViews::WebsiteId)
                            .to(Websites::Table, Websites::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_page_views_session")
                            .from(PageViews::Table, PageViews::SessionId)
                            .to(UserSessions::Table, UserSessions::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_page_views_website_created")
                    .table(PageViews::Table)
                    .col(PageViews::WebsiteId)
                    .col(PageViews::CreatedAt)
                    .if_not_exists()
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(Events::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Events::Id)
                            .big_integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Events::SessionId).big_integer().not_null())
                    .col(ColumnDef::new(Events::WebsiteId).integer().not_null())
                    .col(ColumnDef::new(Events::UrlPath).text().not_null())
                    .col(ColumnDef::new(Events::EventName).string_len(100).not_null())
                    .col(ColumnDef::new(Events::EventData).json_binary().null())
                    .col(
                        ColumnDef::new(Events::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_events_website")
                            .from(Events::Table, Events::WebsiteId)
                            .to(Websites::Table, Websites::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_events_session")
                            .from(Events::Table, Events::SessionId)
                            .to(UserSessions::Table, UserSessions::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_events_website_created")
                    .table(Events::Table)
                    .col(Events::WebsiteId)
                    .col(Events::CreatedAt)
                    .if_not_exists()
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(DeviceInfo::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(DeviceInfo::Id)
                            .big_integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(DeviceInfo::WebsiteId).integer().not_null())
                    .col(ColumnDef::new(DeviceInfo::Browser).string().not_null())
                    .col(ColumnDef::new(DeviceInfo::Os).string().not_null())
                    .col(ColumnDef::new(DeviceInfo::Device).string().not_null())
                    .col(ColumnDef::new(DeviceInfo::Date).date().not_null())
                    .col(
                        ColumnDef::new(DeviceInfo::Count)
                            .big_integer()
                            .not_null()
                            .default(0),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_device_info_website")
                            .from(DeviceInfo::Table, DeviceInfo::WebsiteId)
                            .to(Websites::Table, Websites::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        // Conflict target of the daily counter upsert
        manager
            .create_index(
                Index::create()
                    .name("uq_device_info_daily")
                    .table(DeviceInfo::Table)
                    .col(DeviceInfo::WebsiteId)
                    .col(DeviceInfo::Browser)
                    .col(DeviceInfo::Os)
                    .col(DeviceInfo::Device)
                    .col(DeviceInfo::Date)
                    .unique()
                    .if_not_exists()
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(DeviceInfo::Table).if_exists().to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Events::Table).if_exists().to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(PageViews::Table).if_exists().to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(UserSessions::Table).if_exists().to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Websites::Table).if_exists().to_owned())
            .await?;

        Ok(())
    }
}

#[derive(DeriveIden)]
enum Websites {
    Table,
    Id,
    Name,
    Domain,
    CreatedAt,
}

#[derive(DeriveIden)]
enum UserSessions {
    Table,
    Id,
    SessionId,
    WebsiteId,
    Browser,
    Os,
    Device,
    DistinctId,
    Country,
    Region,
    City,
    Language,
    Screen,
    CreatedAt,
}

#[derive(DeriveIden)]
enum PageViews {
    Table,
    Id,
    SessionId,
    WebsiteId,
    UrlPath,
    UrlQuery,
    PageTitle,
    ReferrerPath,
    ReferrerQuery,
    ReferrerDomain,
    UtmSource,
    UtmMedium,
    UtmCampaign,
    UtmContent,
    UtmTerm,
    CreatedAt,
}

#[derive(DeriveIden)]
enum Events {
    Table,
    Id,
    SessionId,
    WebsiteId,
    UrlPath,
    EventName,
    EventData,
    CreatedAt,
}

#[derive(DeriveIden)]
enum DeviceInfo {
    Table,
    Id,
    WebsiteId,
    Browser,
    Os,
    Device,
    Date,
    Count,
}
