//! Template resolution for change batches
//!
//! Every record change carries templates in its name and in each of its
//! values. [`resolve`] renders them in place, strictly in document order:
//!
//! ```text
//! change 0: name ─► value 0 ─► value 1 ─► ...
//! change 1: name ─► value 0 ─► ...
//! ...
//! ```
//!
//! Templates may reference:
//!
//! | Placeholder | Rendered as |
//! |---|---|
//! | `{{InstanceID}}` | instance ID |
//! | `{{InstancePrivateIPAddress}}` | private address, or empty |
//! | `{{InstancePublicIPAddress}}` | public address, or empty |
//! | `{{ExistingRDataValue s v}}` | value `v` of the record set currently published under change `s`'s name and type |
//!
//! `ExistingRDataValue` reads the *rendered* name of change `s` from the batch
//! being resolved, so `s` must already have its name rendered: any earlier
//! change, or the current change while its values are rendered. Anything
//! else is rejected before the record store is queried.
//!
//! Any failure aborts the whole batch. Rendering has no state of its own, so
//! the same batch rendered against the same context and store contents
//! always yields the same literals.

mod parser;

pub use parser::{Action, Segment, Template};

use tracing::info;

use crate::error::{Error, Result};
use crate::instance::InstanceAttributes;
use crate::lookup::ExistingRecordLookup;
use crate::notification::{MutationInstruction, RecordChange};

/// Everything a template can see while it is rendered
#[derive(Debug)]
pub struct ResolutionContext<'a> {
    /// Instance the lifecycle action is about
    pub instance: InstanceAttributes,
    /// Zone queried by `ExistingRDataValue`
    pub hosted_zone_id: String,
    lookup: ExistingRecordLookup<'a>,
}

impl<'a> ResolutionContext<'a> {
    /// Create a resolution context
    pub fn new(
        instance: InstanceAttributes,
        hosted_zone_id: impl Into<String>,
        lookup: ExistingRecordLookup<'a>,
    ) -> Self {
        Self {
            instance,
            hosted_zone_id: hosted_zone_id.into(),
            lookup,
        }
    }
}

/// Read-only view of the batch under resolution
///
/// Names of changes `0..rendered_names` hold rendered literals; the rest
/// still hold templates.
#[derive(Debug, Clone, Copy)]
pub struct BatchView<'b> {
    changes: &'b [RecordChange],
    rendered_names: usize,
}

impl<'b> BatchView<'b> {
    /// Create a view in which the first `rendered_names` names are rendered
    pub fn new(changes: &'b [RecordChange], rendered_names: usize) -> Self {
        Self {
            changes,
            rendered_names,
        }
    }
}

/// Render every template in the instruction, in place
///
/// # Returns
///
/// - `Ok(())`: Every name and value now holds a literal
/// - `Err(Error)`: `TemplateSyntax`, `TemplateEval`, or the `RecordNotFound` /
///   `Query` error of a failed existing-value lookup. The instruction is left
///   partially rendered and must not be submitted.
pub async fn resolve(instruction: &mut MutationInstruction, ctx: &ResolutionContext<'_>) -> Result<()> {
    info!("Writing template values for change batch");

    for index in 0..instruction.changes.len() {
        let name = render_field(
            &instruction.changes[index].record_set.name,
            ctx,
            BatchView::new(&instruction.changes, index),
            || format!("record set #{} name", index),
        )
        .await?;
        instruction.changes[index].record_set.name = name;

        for value_index in 0..instruction.changes[index].record_set.records.len() {
            let value = render_field(
                &instruction.changes[index].record_set.records[value_index].value,
                ctx,
                BatchView::new(&instruction.changes, index + 1),
                || format!("record set #{} value #{}", index, value_index),
            )
            .await?;
            instruction.changes[index].record_set.records[value_index].value = value;
        }

        log_rendered(&instruction.changes[index]);
    }

    Ok(())
}

async fn render_field(
    source: &str,
    ctx: &ResolutionContext<'_>,
    batch: BatchView<'_>,
    location: impl Fn() -> String,
) -> Result<String> {
    let template = Template::parse(source).map_err(|e| match e {
        Error::TemplateSyntax { template, message } => Error::TemplateSyntax {
            template,
            message: format!("{}: {}", location(), message),
        },
        other => other,
    })?;

    render(&template, ctx, batch).await.map_err(|e| match e {
        Error::TemplateEval(message) => Error::template_eval(format!("{}: {}", location(), message)),
        other => other,
    })
}

/// Render a single parsed template
pub async fn render(template: &Template, ctx: &ResolutionContext<'_>, batch: BatchView<'_>) -> Result<String> {
    let mut out = String::with_capacity(template.source().len());

    for segment in template.segments() {
        match segment {
            Segment::Text(text) => out.push_str(text),
            Segment::Action(Action::InstanceId) => out.push_str(&ctx.instance.instance_id),
            Segment::Action(Action::PrivateIpAddress) => {
                out.push_str(&ctx.instance.private_ip_address)
            }
            Segment::Action(Action::PublicIpAddress) => {
                out.push_str(&ctx.instance.public_ip_address)
            }
            Segment::Action(Action::ExistingRDataValue {
                set_index,
                value_index,
            }) => {
                let value = existing_value(ctx, batch, *set_index, *value_index).await?;
                out.push_str(&value);
            }
        }
    }

    Ok(out)
}

async fn existing_value(
    ctx: &ResolutionContext<'_>,
    batch: BatchView<'_>,
    set_index: i64,
    value_index: i64,
) -> Result<String> {
    let set = usize::try_from(set_index)
        .ok()
        .filter(|&i| i < batch.changes.len())
        .ok_or_else(|| {
            Error::template_eval(format!("Requested rrSet index of {} out of range", set_index))
        })?;

    if set >= batch.rendered_names {
        return Err(Error::template_eval(format!(
            "Requested rrSet index of {} refers to a record whose name is not rendered yet",
            set_index
        )));
    }

    let change = &batch.changes[set];
    let values = ctx
        .lookup
        .lookup(&ctx.hosted_zone_id, change.name(), change.record_type())
        .await?;

    usize::try_from(value_index)
        .ok()
        .and_then(|i| values.into_iter().nth(i))
        .ok_or_else(|| {
            Error::template_eval(format!(
                "Requested rDataIndex index of {} out of range",
                value_index
            ))
        })
}

fn log_rendered(change: &RecordChange) {
    let ttl = change
        .record_set
        .ttl
        .map(|ttl| ttl.to_string())
        .unwrap_or_else(|| "-".to_string());
    let values: Vec<&str> = change.values().collect();

    info!(
        "Record written: {} {} {} {}",
        change.name(),
        ttl,
        change.record_type(),
        values.join(",")
    );
}
