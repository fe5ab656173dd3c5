use std::sync::Arc;

use tracing::{debug, info};

use crate::{
    builder::QueryBuilder,
    catalog::CatalogProvider,
    functions::FunctionRegistry,
    sql::ast::{SetOperation, Statement},
    translator::{
        OrderByResolver, SelectTranslator, Translation, TranslationContext, TranslationError, TranslatorConfig,
    },
};

/// Entry point: turns a parsed SELECT statement into a graph query over the
/// mapped catalog.
pub struct Translator {
    catalog: Arc<dyn CatalogProvider>,
    functions: FunctionRegistry,
    config: TranslatorConfig,
}

impl Translator {
    pub fn new(catalog: Arc<dyn CatalogProvider>) -> Self {
        Self { catalog, functions: FunctionRegistry::default_registry(), config: TranslatorConfig::default() }
    }

    pub fn with_config(mut self, config: TranslatorConfig) -> Result<Self, TranslationError> {
        config.validate()?;
        self.config = config;
        Ok(self)
    }

    pub fn with_functions(mut self, functions: FunctionRegistry) -> Self {
        self.functions = functions;
        self
    }

    pub fn config(&self) -> &TranslatorConfig {
        &self.config
    }

    pub fn functions(&self) -> &FunctionRegistry {
        &self.functions
    }

    /// Translate one statement. Nothing is kept between calls.
    pub fn translate(&self, statement: &Statement) -> Result<Translation, TranslationError> {
        let translation = match statement {
            Statement::Select(query) => {
                let mut ctx = self.context();
                SelectTranslator::translate(query, &mut ctx)?;
                ctx.builder.build()?
            }
            Statement::Union(operation) => self.translate_union(operation)?.build()?,
        };
        info!(columns = translation.columns.len(), "statement translated");
        debug!(query = %translation.text(), "graph query");
        Ok(translation)
    }

    fn translate_union(&self, operation: &SetOperation) -> Result<QueryBuilder, TranslationError> {
        if operation.branches.len() < 2 {
            return TranslationError::unsupported("UNION needs at least two branches").err();
        }
        let mut branches = Vec::with_capacity(operation.branches.len());
        for (index, branch) in operation.branches.iter().enumerate() {
            if !branch.order_by.is_empty() || branch.limit.is_some() || branch.offset.is_some() {
                return TranslationError::unsupported(format!(
                    "ORDER BY, LIMIT or OFFSET inside UNION branch {}",
                    index + 1
                ))
                .err();
            }
            let mut ctx = self.context();
            SelectTranslator::translate(branch, &mut ctx)?;
            branches.push(ctx.builder);
        }

        let mut builder = QueryBuilder::new(&self.config);
        builder.union(branches, operation.all);
        OrderByResolver::resolve_union(&operation.order_by, &mut builder)?;
        if let Some(limit) = operation.limit {
            builder.set_limit(SelectTranslator::row_count(limit, "LIMIT")?);
        }
        if let Some(offset) = operation.offset {
            builder.set_offset(SelectTranslator::row_count(offset, "OFFSET")?);
        }
        Ok(builder)
    }

    fn context(&self) -> TranslationContext<'_> {
        TranslationContext::new(self.catalog.as_ref(), &self.functions, &self.config)
    }
}
