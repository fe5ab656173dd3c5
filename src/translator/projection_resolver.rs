use tracing::trace;

use crate::{
    names::{QualifiedName, SegmentMask},
    query::QueryTableInfo,
    sql::ast::{Identifier, ScalarExpr},
    translator::{Clause, ReferenceKind, ScalarTranslator, TranslationContext, TranslationError},
};

pub struct ProjectionResolver;

impl ProjectionResolver {
    /// Bind the select list, in order, into result columns.
    pub fn resolve(projection: &[Identifier], ctx: &mut TranslationContext) -> Result<(), TranslationError> {
        for (index, item) in projection.iter().enumerate() {
            match &item.expression {
                ScalarExpr::WildCard => {
                    let tables: Vec<QueryTableInfo> = ctx.builder.symbols().tables().iter().cloned().collect();
                    for table in &tables {
                        Self::expand_wildcard(table, ctx)?;
                    }
                }
                ScalarExpr::WildCardWithCollection(path) => {
                    let pattern = QualifiedName::pattern_from_parts(path, SegmentMask::TABLE)?;
                    let table = ctx
                        .builder
                        .symbols()
                        .table(&pattern)?
                        .cloned()
                        .ok_or_else(|| TranslationError::unknown(ReferenceKind::Table, path.join(".")))?;
                    Self::expand_wildcard(&table, ctx)?;
                }
                ScalarExpr::Column(column) => {
                    let info = ctx.resolve_column(column)?;
                    if let Some(alias) = &item.alias {
                        ctx.builder.bind_alias(&info, alias)?;
                    }
                    ctx.builder.add_projection(&info, item.alias.as_deref())?;
                }
                expression => {
                    let typed = ScalarTranslator::translate(expression, ctx, Clause::Select)?;
                    let position = index + 1;
                    let label = item.alias.clone().unwrap_or_else(|| Self::default_label(expression, position));
                    let info = ctx.builder.add_computed(position, typed.expression, typed.sql_type, typed.nullable)?;
                    ctx.builder.add_projection(&info, Some(&label))?;
                }
            }
        }
        Ok(())
    }

    /// Every column of `table`, in declared order.
    fn expand_wildcard(table: &QueryTableInfo, ctx: &mut TranslationContext) -> Result<(), TranslationError> {
        trace!(table = %table.name(), "expanding wildcard");
        for column in table.base().columns().to_vec() {
            let info = ctx.builder.bind_column(table, column)?;
            ctx.builder.add_projection(&info, None)?;
        }
        Ok(())
    }

    fn default_label(expression: &ScalarExpr, position: usize) -> String {
        match expression {
            ScalarExpr::Function(function) => function.name.to_ascii_lowercase(),
            _ => format!("expr{}", position),
        }
    }
}
