use datafusion_common::Column;
use datafusion_expr::Expr;

pub fn flat_col(col_name: &str) -> Expr {
    Expr::Column(Column::from_name(col_name))
}
