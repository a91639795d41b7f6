//! Template parsing
//!
//! The template surface is small: literal text interleaved with
//! `{{ ... }}` actions naming one of four fields.

use crate::error::{Error, Result};

const OPEN: &str = "{{";
const CLOSE: &str = "}}";

/// A field a template action can reference
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    /// `{{InstanceID}}`
    InstanceId,
    /// `{{InstancePrivateIPAddress}}`
    PrivateIpAddress,
    /// `{{InstancePublicIPAddress}}`
    PublicIpAddress,
    /// `{{ExistingRDataValue <set> <value>}}`
    ///
    /// Indices are kept signed so a negative index surfaces as an
    /// out-of-range evaluation error rather than a syntax error.
    ExistingRDataValue {
        /// Index of the record change in the batch
        set_index: i64,
        /// Index of the value within the published record set
        value_index: i64,
    },
}

/// A piece of a parsed template
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Segment {
    /// Literal text, copied verbatim
    Text(String),
    /// A field reference
    Action(Action),
}

/// A parsed template
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Template {
    source: String,
    segments: Vec<Segment>,
}

impl Template {
    /// Parse a template string
    ///
    /// # Returns
    ///
    /// - `Ok(Template)`: The parsed template
    /// - `Err(Error::TemplateSyntax)`: Unterminated or empty action, unknown
    ///   field, wrong argument count or a non-integer argument
    pub fn parse(source: &str) -> Result<Self> {
        let mut segments = Vec::new();
        let mut rest = source;

        while let Some(start) = rest.find(OPEN) {
            if start > 0 {
                segments.push(Segment::Text(rest[..start].to_string()));
            }

            let after_open = &rest[start + OPEN.len()..];
            let end = after_open
                .find(CLOSE)
                .ok_or_else(|| Error::template_syntax(source, "unterminated action"))?;

            let action = parse_action(source, &after_open[..end])?;
            segments.push(Segment::Action(action));

            rest = &after_open[end + CLOSE.len()..];
        }

        if !rest.is_empty() {
            segments.push(Segment::Text(rest.to_string()));
        }

        Ok(Self {
            source: source.to_string(),
            segments,
        })
    }

    /// The original template string
    pub fn source(&self) -> &str {
        &self.source
    }

    /// Parsed segments in order
    pub fn segments(&self) -> &[Segment] {
        &self.segments
    }
}

fn parse_action(source: &str, body: &str) -> Result<Action> {
    let mut words = body.split_whitespace();

    let field = words
        .next()
        .ok_or_else(|| Error::template_syntax(source, "empty action"))?;
    // `{{.InstanceID}}` is the Go-template spelling of the same field.
    let field = field.strip_prefix('.').unwrap_or(field);
    let args: Vec<&str> = words.collect();

    let action = match field {
        "InstanceID" => Action::InstanceId,
        "InstancePrivateIPAddress" => Action::PrivateIpAddress,
        "InstancePublicIPAddress" => Action::PublicIpAddress,
        "ExistingRDataValue" => {
            if args.len() != 2 {
                return Err(Error::template_syntax(
                    source,
                    format!("ExistingRDataValue takes 2 arguments, got {}", args.len()),
                ));
            }
            return Ok(Action::ExistingRDataValue {
                set_index: parse_index(source, args[0])?,
                value_index: parse_index(source, args[1])?,
            });
        }
        "" => return Err(Error::template_syntax(source, "empty field name")),
        other => {
            return Err(Error::template_syntax(
                source,
                format!("unknown field {:?}", other),
            ));
        }
    };

    if !args.is_empty() {
        return Err(Error::template_syntax(
            source,
            format!("{} takes no arguments", field),
        ));
    }

    Ok(action)
}

fn parse_index(source: &str, arg: &str) -> Result<i64> {
    arg.parse()
        .map_err(|_| Error::template_syntax(source, format!("{:?} is not an integer", arg)))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn text(s: &str) -> Segment {
        Segment::Text(s.to_string())
    }

    #[test]
    fn parses_fields_between_text() {
        let template = Template::parse("{{InstanceID}}.example.com.").unwrap();
        assert_eq!(
            template.segments(),
            &[Segment::Action(Action::InstanceId), text(".example.com.")]
        );
    }

    #[test]
    fn accepts_leading_dot_and_inner_whitespace() {
        let dotted = Template::parse("{{.InstancePublicIPAddress}}").unwrap();
        let spaced = Template::parse("{{  InstancePublicIPAddress }}").unwrap();
        assert_eq!(dotted.segments(), spaced.segments());
        assert_eq!(dotted.segments(), &[Segment::Action(Action::PublicIpAddress)]);
    }

    #[test]
    fn parses_existing_value_indices() {
        let template = Template::parse("a {{.ExistingRDataValue 1 -2}} b").unwrap();
        assert_eq!(
            template.segments(),
            &[
                text("a "),
                Segment::Action(Action::ExistingRDataValue {
                    set_index: 1,
                    value_index: -2,
                }),
                text(" b"),
            ]
        );
    }

    #[test]
    fn literal_template_keeps_text() {
        let template = Template::parse("www.example.com. }} stray").unwrap();
        assert_eq!(template.segments(), &[text("www.example.com. }} stray")]);

        assert!(Template::parse("").unwrap().segments().is_empty());
    }

    #[test]
    fn rejects_malformed_actions() {
        for bad in [
            "{{InstanceID",
            "{{}}",
            "{{ . }}",
            "{{Hostname}}",
            "{{InstanceID 1}}",
            "{{ExistingRDataValue 0}}",
            "{{ExistingRDataValue 0 0 0}}",
            "{{ExistingRDataValue zero 0}}",
        ] {
            let err = Template::parse(bad).unwrap_err();
            assert!(
                matches!(err, Error::TemplateSyntax { .. }),
                "{:?} should be a syntax error, got {:?}",
                bad,
                err
            );
        }
    }
}
