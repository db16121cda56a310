use std::any::Any;
use std::sync::Arc;

use chassis_core::{Behavior, BehaviorSet, ExtensionError};
use serde_json::Value;

/// ORM-agnostic query description the built-in behavior sets operate on.
/// Applications with their own query abstraction supply their own sets.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct QueryDescriptor {
    pub table: String,
    pub filters: Vec<Filter>,
    pub order_by: Vec<(String, SortDirection)>,
    pub limit: Option<u64>,
    pub offset: Option<u64>,
}

impl QueryDescriptor {
    pub fn for_table(table: impl Into<String>) -> Self {
        Self {
            table: table.into(),
            ..Self::default()
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct Filter {
    pub column: String,
    pub operator: String,
    pub value: Value,
}

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum SortDirection {
    Ascending,
    Descending,
}

struct WhereLike;

impl Behavior for WhereLike {
    fn invoke(&self, target: &mut dyn Any, args: &[Value]) -> Result<Value, ExtensionError> {
        let query = descriptor(target, "where_like")?;
        let column = string_arg(args, 0, "where_like")?;
        let pattern = string_arg(args, 1, "where_like")?;
        query.filters.push(Filter {
            column,
            operator: "like".to_string(),
            value: Value::String(pattern),
        });
        Ok(Value::Null)
    }
}

struct Latest;

impl Behavior for Latest {
    fn invoke(&self, target: &mut dyn Any, args: &[Value]) -> Result<Value, ExtensionError> {
        let query = descriptor(target, "latest")?;
        let column = optional_string_arg(args, 0).unwrap_or_else(|| "created_at".to_string());
        query.order_by.push((column, SortDirection::Descending));
        Ok(Value::Null)
    }
}

struct Oldest;

impl Behavior for Oldest {
    fn invoke(&self, target: &mut dyn Any, args: &[Value]) -> Result<Value, ExtensionError> {
        let query = descriptor(target, "oldest")?;
        let column = optional_string_arg(args, 0).unwrap_or_else(|| "created_at".to_string());
        query.order_by.push((column, SortDirection::Ascending));
        Ok(Value::Null)
    }
}

struct Paginate;

impl Behavior for Paginate {
    fn invoke(&self, target: &mut dyn Any, args: &[Value]) -> Result<Value, ExtensionError> {
        let query = descriptor(target, "paginate")?;
        let page = number_arg(args, 0, "paginate")?.max(1);
        let per_page = number_arg(args, 1, "paginate")?.max(1);
        query.limit = Some(per_page);
        query.offset = Some((page - 1) * per_page);
        Ok(Value::Null)
    }
}

pub struct ListQueryBehaviors;

impl BehaviorSet for ListQueryBehaviors {
    fn id(&self) -> &str {
        "list_query"
    }

    fn behaviors(&self) -> Vec<(String, Arc<dyn Behavior>)> {
        vec![
            ("where_like".to_string(), Arc::new(WhereLike) as Arc<dyn Behavior>),
            ("latest".to_string(), Arc::new(Latest)),
            ("oldest".to_string(), Arc::new(Oldest)),
        ]
    }
}

pub struct PaginationBehaviors;

impl BehaviorSet for PaginationBehaviors {
    fn id(&self) -> &str {
        "pagination"
    }

    fn behaviors(&self) -> Vec<(String, Arc<dyn Behavior>)> {
        vec![("paginate".to_string(), Arc::new(Paginate) as Arc<dyn Behavior>)]
    }
}

fn descriptor<'a>(
    target: &'a mut dyn Any,
    behavior: &str,
) -> Result<&'a mut QueryDescriptor, ExtensionError> {
    target
        .downcast_mut::<QueryDescriptor>()
        .ok_or_else(|| ExtensionError::BadTarget(behavior.to_string()))
}

fn string_arg(args: &[Value], index: usize, behavior: &str) -> Result<String, ExtensionError> {
    optional_string_arg(args, index).ok_or_else(|| {
        ExtensionError::Invocation(
            behavior.to_string(),
            format!("missing string argument {index}"),
        )
    })
}

fn optional_string_arg(args: &[Value], index: usize) -> Option<String> {
    args.get(index)
        .and_then(Value::as_str)
        .map(str::to_string)
}

fn number_arg(args: &[Value], index: usize, behavior: &str) -> Result<u64, ExtensionError> {
    args.get(index).and_then(Value::as_u64).ok_or_else(|| {
        ExtensionError::Invocation(
            behavior.to_string(),
            format!("missing numeric argument {index}"),
        )
    })
}
