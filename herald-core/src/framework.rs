use sqlx::PgPool;

/// Receiver type for database query structs.
///
/// Every query against the games database is expressed as a struct
/// implementing [`kanau::processor::Processor`] for this type, keeping
/// the SQL next to the record it produces. This core only ever reads.
pub struct DatabaseProcessor {
    pub pool: PgPool,
}
