use db::sea_query::{Expr, Func, IntoIden, LikeExpr, SimpleExpr};

/// Case-insensitive substring match against a column.
///
/// Both sides are lowercased. The needle is matched literally, `%` and `_`
/// inside of it are escaped.
pub(crate) fn contains<T, C>(table: T, column: C, needle: &str) -> SimpleExpr
where
    T: IntoIden + 'static,
    C: IntoIden + 'static,
{
    let pattern = format!("%{}%", escape_like(&needle.to_lowercase()));

    Expr::expr(Func::lower(Expr::col((table, column)))).like(LikeExpr::new(pattern).escape('\\'))
}

fn escape_like(value: &str) -> String {
    value
        .replace('\\', "\\\\")
        .replace('%', "\\%")
        .replace('_', "\\_")
}

/// Normalize an optional search query, treating blank queries as missing ones.
pub(crate) fn query(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|value| !value.is_empty())
}
