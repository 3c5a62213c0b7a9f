pub use sea_orm_migration::prelude::*;

mod m20240301_000001_create_users_table;
mod m20240301_000002_create_authentication_tokens_table;
mod m20240301_000003_create_directions_table;
mod m20240301_000004_create_problems_table;
mod m20240301_000005_create_problem_files_table;
mod m20240301_000006_create_solutions_table;
mod m20240301_000007_create_solution_files_table;
mod m20240301_000008_seed_directions;

pub(crate) use m20240301_000001_create_users_table::Users;
pub(crate) use m20240301_000003_create_directions_table::Directions;
pub(crate) use m20240301_000004_create_problems_table::Problems;
pub(crate) use m20240301_000006_create_solutions_table::Solutions;

pub struct Migrator;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![
            Box::new(m20240301_000001_create_users_table::Migration),
            Box::new(m20240301_000002_create_authentication_tokens_table::Migration),
            Box::new(m20240301_000003_create_directions_table::Migration),
            Box::new(m20240301_000004_create_problems_table::Migration),
            Box::new(m20240301_000005_create_problem_files_table::Migration),
            Box::new(m20240301_000006_create_solutions_table::Migration),
            Box::new(m20240301_000007_create_solution_files_table::Migration),
            Box::new(m20240301_000008_seed_directions::Migration),
        ]
    }
}
