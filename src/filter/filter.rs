use super::error::FilterError;
use super::types::{FilterCondition, FilterOp, OrderInfo, SortDirection};

/// Builds the query-parameter set for one table read against the hosted
/// data API: projection, row filters, ordering and limit.
///
/// The projection is a single string because the wire format is one
/// `select=` parameter, and join-expansion (`site:sites(id,name)`) is part
/// of that string. Filter columns stay individually validated.
pub struct Filter {
    table_name: String,
    projection: Option<String>,
    conditions: Vec<FilterCondition>,
    order: Vec<OrderInfo>,
    limit: Option<u32>,
}

impl Filter {
    pub fn new(table_name: impl Into<String>) -> Result<Self, FilterError> {
        let table_name = table_name.into();
        Self::validate_table_name(&table_name)?;
        Ok(Self {
            table_name,
            projection: None,
            conditions: vec![],
            order: vec![],
            limit: None,
        })
    }

    pub fn table(&self) -> &str {
        &self.table_name
    }

    pub fn select(&mut self, projection: impl Into<String>) -> Result<&mut Self, FilterError> {
        let projection = projection.into();
        Self::validate_projection(&projection)?;
        self.projection = Some(projection);
        Ok(self)
    }

    pub fn condition(
        &mut self,
        column: impl Into<String>,
        op: FilterOp,
        value: impl Into<String>,
    ) -> Result<&mut Self, FilterError> {
        let column = column.into();
        Self::validate_column(&column)?;
        self.conditions.push(FilterCondition {
            column,
            op,
            value: value.into(),
        });
        Ok(self)
    }

    /// Set-membership filter, rendered as `col=in.(a,b,c)`.
    pub fn condition_in<I, S>(
        &mut self,
        column: impl Into<String>,
        values: I,
    ) -> Result<&mut Self, FilterError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let list = values
            .into_iter()
            .map(|v| v.as_ref().to_string())
            .collect::<Vec<_>>()
            .join(",");
        self.condition(column, FilterOp::In, format!("({})", list))
    }

    pub fn order(
        &mut self,
        column: impl Into<String>,
        direction: SortDirection,
    ) -> Result<&mut Self, FilterError> {
        let column = column.into();
        Self::validate_column(&column)?;
        self.order.push(OrderInfo { column, direction });
        Ok(self)
    }

    pub fn limit(&mut self, limit: u32) -> Result<&mut Self, FilterError> {
        if limit == 0 {
            return Err(FilterError::InvalidLimit(
                "Limit must be at least 1".to_string(),
            ));
        }
        self.limit = Some(limit);
        Ok(self)
    }

    /// Render to query pairs. Order of pairs is stable: projection first,
    /// then filters in insertion order, then ordering, then limit — cache
    /// keys and tests rely on that stability.
    pub fn to_query_pairs(&self) -> Vec<(String, String)> {
        let mut pairs = Vec::with_capacity(self.conditions.len() + 3);

        if let Some(projection) = &self.projection {
            pairs.push(("select".to_string(), projection.clone()));
        }

        for cond in &self.conditions {
            pairs.push((
                cond.column.clone(),
                format!("{}.{}", cond.op.as_param(), cond.value),
            ));
        }

        if !self.order.is_empty() {
            let rendered = self
                .order
                .iter()
                .map(|o| format!("{}.{}", o.column, o.direction.as_param()))
                .collect::<Vec<_>>()
                .join(",");
            pairs.push(("order".to_string(), rendered));
        }

        if let Some(limit) = self.limit {
            pairs.push(("limit".to_string(), limit.to_string()));
        }

        pairs
    }

    fn validate_table_name(name: &str) -> Result<(), FilterError> {
        if name.is_empty() {
            return Err(FilterError::InvalidTableName(
                "Table name cannot be empty".to_string(),
            ));
        }
        let mut chars = name.chars();
        let first = chars.next().unwrap();
        if !(first.is_alphabetic() || first == '_')
            || !name.chars().all(|c| c.is_alphanumeric() || c == '_')
        {
            return Err(FilterError::InvalidTableName(format!(
                "Invalid table name format: {}",
                name
            )));
        }
        Ok(())
    }

    fn validate_column(column: &str) -> Result<(), FilterError> {
        if column.is_empty() {
            return Err(FilterError::InvalidColumn(
                "Column name cannot be empty".to_string(),
            ));
        }
        let mut chars = column.chars();
        let first = chars.next().unwrap();
        if !(first.is_alphabetic() || first == '_')
            || !column.chars().all(|c| c.is_alphanumeric() || c == '_')
        {
            return Err(FilterError::InvalidColumn(format!(
                "Invalid column name format: {}",
                column
            )));
        }
        Ok(())
    }

    // Projections embed related-row syntax (alias:table(cols)), so this is
    // looser than column validation: printable, no whitespace, no wildcard.
    fn validate_projection(projection: &str) -> Result<(), FilterError> {
        if projection.is_empty() {
            return Err(FilterError::InvalidProjection(
                "Projection cannot be empty".to_string(),
            ));
        }
        if projection.contains('*') {
            return Err(FilterError::InvalidProjection(
                "Explicit column lists only; '*' is not allowed".to_string(),
            ));
        }
        if projection.chars().any(char::is_whitespace) {
            return Err(FilterError::InvalidProjection(
                "Projection must not contain whitespace".to_string(),
            ));
        }
        Ok(())
    }
}
