use sea_orm_migration::prelude::*;

pub struct Migrator;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![
            Box::new(m20240301_000001_create_maps_table::Migration),
            Box::new(m20240301_000002_create_employees_table::Migration),
            Box::new(m20240301_000003_create_locations_table::Migration),
        ]
    }
}

// Migration implementations

mod m20240301_000001_create_maps_table {

    use sea_orm_migration::prelude::*;

    pub struct Migration;

    impl MigrationName for Migration {
        fn name(&self) -> &str {
            "m20240301_000001_create_maps_table"
        }
    }

    #[async_trait::async_trait]
    impl MigrationTrait for Migration {
        async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            // Create maps table aligned with entities::map Model
            manager
                .create_table(
                    Table::create()
                        .table(Maps::Table)
                        .if_not_exists()
                        .col(ColumnDef::new(Maps::Id).uuid().primary_key().not_null())
                        .col(ColumnDef::new(Maps::Name).string().not_null())
                        .col(ColumnDef::new(Maps::State).string().not_null())
                        .col(ColumnDef::new(Maps::City).string().not_null())
                        .col(ColumnDef::new(Maps::Building).string().not_null())
                        .col(ColumnDef::new(Maps::Floor).string().not_null())
                        .col(ColumnDef::new(Maps::ImageUrl).string().not_null())
                        .col(ColumnDef::new(Maps::CreatedAt).timestamp().not_null())
                        .col(ColumnDef::new(Maps::UpdatedAt).timestamp().null())
                        .to_owned(),
                )
                .await?;

            // Supports the (state, city, building) list ordering and locale filters
            manager
                .create_index(
                    Index::create()
                        .if_not_exists()
                        .name("idx_maps_locale")
                        .table(Maps::Table)
                        .col(Maps::State)
                        .col(Maps::City)
                        .col(Maps::Building)
                        .to_owned(),
                )
                .await
        }

        async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .drop_table(Table::drop().table(Maps::Table).to_owned())
                .await
        }
    }

    #[derive(DeriveIden)]
    pub(super) enum Maps {
        Table,
        Id,
        Name,
        State,
        City,
        Building,
        Floor,
        ImageUrl,
        CreatedAt,
        UpdatedAt,
    }
}

mod m20240301_000002_create_employees_table {

    use sea_orm_migration::prelude::*;

    pub struct Migration;

    impl MigrationName for Migration {
        fn name(&self) -> &str {
            "m20240301_000002_create_employees_table"
        }
    }

    #[async_trait::async_trait]
    impl MigrationTrait for Migration {
        async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .create_table(
                    Table::create()
                        .table(Employees::Table)
                        .if_not_exists()
                        .col(
                            ColumnDef::new(Employees::Id)
                                .uuid()
                                .primary_key()
                                .not_null(),
                        )
                        .col(ColumnDef::new(Employees::Name).string().not_null())
                        .col(ColumnDef::new(Employees::Phone).string().not_null())
                        .col(ColumnDef::new(Employees::Email).string().not_null())
                        .col(ColumnDef::new(Employees::PictureUrl).string().null())
                        .col(ColumnDef::new(Employees::CreatedAt).timestamp().not_null())
                        .col(ColumnDef::new(Employees::UpdatedAt).timestamp().null())
                        .to_owned(),
                )
                .await?;

            // Email uniqueness is part of the write contract; the index makes
            // the store enforce it as well
            manager
                .create_index(
                    Index::create()
                        .if_not_exists()
                        .unique()
                        .name("idx_employees_email")
                        .table(Employees::Table)
                        .col(Employees::Email)
                        .to_owned(),
                )
                .await?;

            manager
                .create_index(
                    Index::create()
                        .if_not_exists()
                        .name("idx_employees_name")
                        .table(Employees::Table)
                        .col(Employees::Name)
                        .to_owned(),
                )
                .await
        }

        async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .drop_table(Table::drop().table(Employees::Table).to_owned())
                .await
        }
    }

    #[derive(DeriveIden)]
    pub(super) enum Employees {
        Table,
        Id,
        Name,
        Phone,
        Email,
        PictureUrl,
        CreatedAt,
        UpdatedAt,
    }
}

mod m20240301_000003_create_locations_table {

    use super::m20240301_000001_create_maps_table::Maps;
    use super::m20240301_000002_create_employees_table::Employees;
    use sea_orm_migration::prelude::*;

    pub struct Migration;

    impl MigrationName for Migration {
        fn name(&self) -> &str {
            "m20240301_000003_create_locations_table"
        }
    }

    #[async_trait::async_trait]
    impl MigrationTrait for Migration {
        async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            // Deleting a map or an employee removes its pins at the store
            // level, so reads never see dangling references
            manager
                .create_table(
                    Table::create()
                        .table(Locations::Table)
                        .if_not_exists()
                        .col(
                            ColumnDef::new(Locations::Id)
                                .uuid()
                                .primary_key()
                                .not_null(),
                        )
                        .col(ColumnDef::new(Locations::MapId).uuid().not_null())
                        .col(ColumnDef::new(Locations::EmployeeId).uuid().not_null())
                        .col(ColumnDef::new(Locations::X).double().not_null())
                        .col(ColumnDef::new(Locations::Y).double().not_null())
                        .col(ColumnDef::new(Locations::CreatedAt).timestamp().not_null())
                        .col(ColumnDef::new(Locations::UpdatedAt).timestamp().null())
                        .foreign_key(
                            ForeignKey::create()
                                .name("fk_locations_map_id")
                                .from(Locations::Table, Locations::MapId)
                                .to(Maps::Table, Maps::Id)
                                .on_delete(ForeignKeyAction::Cascade),
                        )
                        .foreign_key(
                            ForeignKey::create()
                                .name("fk_locations_employee_id")
                                .from(Locations::Table, Locations::EmployeeId)
                                .to(Employees::Table, Employees::Id)
                                .on_delete(ForeignKeyAction::Cascade),
                        )
                        .to_owned(),
                )
                .await?;

            manager
                .create_index(
                    Index::create()
                        .if_not_exists()
                        .name("idx_locations_map_id")
                        .table(Locations::Table)
                        .col(Locations::MapId)
                        .to_owned(),
                )
                .await?;

            manager
                .create_index(
                    Index::create()
                        .if_not_exists()
                        .name("idx_locations_employee_id")
                        .table(Locations::Table)
                        .col(Locations::EmployeeId)
                        .to_owned(),
                )
                .await
        }

        async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .drop_table(Table::drop().table(Locations::Table).to_owned())
                .await
        }
    }

    #[derive(DeriveIden)]
    pub(super) enum Locations {
        Table,
        Id,
        MapId,
        EmployeeId,
        X,
        Y,
        CreatedAt,
        UpdatedAt,
    }
}
