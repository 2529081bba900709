use super::animation::Animation;
use super::scheduler::SharedScheduler;
use crate::error::Result;
use crate::util::camel_case_to_dash_case;
use std::time::Duration;
use trellis_dom::{NodeId, SharedDocument};

/// Entry point for building animations against one document.
#[derive(Clone)]
pub struct AnimationBuilder {
    document: SharedDocument,
    scheduler: SharedScheduler,
}

impl AnimationBuilder {
    pub fn new(document: SharedDocument, scheduler: SharedScheduler) -> Self {
        Self {
            document,
            scheduler,
        }
    }

    pub fn css(&self) -> CssAnimationBuilder {
        CssAnimationBuilder {
            document: self.document.clone(),
            scheduler: self.scheduler.clone(),
            options: CssAnimationOptions::default(),
        }
    }

    pub fn scheduler(&self) -> &SharedScheduler {
        &self.scheduler
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CssAnimationOptions {
    pub classes_to_add: Vec<String>,
    pub classes_to_remove: Vec<String>,
    /// Added on start and removed again on completion.
    pub animation_classes: Vec<String>,
    /// Milliseconds.
    pub duration: Option<u64>,
    /// Milliseconds.
    pub delay: Option<u64>,
    pub from_styles: Vec<(String, String)>,
    pub to_styles: Vec<(String, String)>,
}

/// Chainable description of a class/style transition.
pub struct CssAnimationBuilder {
    document: SharedDocument,
    scheduler: SharedScheduler,
    options: CssAnimationOptions,
}

impl CssAnimationBuilder {
    pub fn add_class(mut self, class_name: impl Into<String>) -> Self {
        self.options.classes_to_add.push(class_name.into());
        self
    }

    pub fn remove_class(mut self, class_name: impl Into<String>) -> Self {
        self.options.classes_to_remove.push(class_name.into());
        self
    }

    pub fn add_animation_class(mut self, class_name: impl Into<String>) -> Self {
        self.options.animation_classes.push(class_name.into());
        self
    }

    pub fn set_duration(mut self, duration_ms: u64) -> Self {
        self.options.duration = Some(duration_ms);
        self
    }

    pub fn set_delay(mut self, delay_ms: u64) -> Self {
        self.options.delay = Some(delay_ms);
        self
    }

    /// Styles applied before the classes change, and after. Names may be camelCase.
    pub fn set_styles<I, J, K, V>(mut self, from: I, to: J) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        J: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        self.options.from_styles = from.into_iter().map(|(k, v)| (k.into(), v.into())).collect();
        self.options.to_styles = to.into_iter().map(|(k, v)| (k.into(), v.into())).collect();
        self
    }

    pub fn options(&self) -> &CssAnimationOptions {
        &self.options
    }

    /// Applies the transition to `element` and schedules its completion
    /// after the element's total transition/animation time.
    pub fn start(self, element: NodeId) -> Result<Animation> {
        let document = &self.document;
        let options = &self.options;

        apply_styles(document, element, &options.from_styles)?;
        if let Some(duration) = options.duration {
            document.set_style(element, "transition-duration", &format!("{duration}ms"))?;
        }
        if let Some(delay) = options.delay {
            document.set_style(element, "transition-delay", &format!("{delay}ms"))?;
        }

        for class_name in &options.classes_to_add {
            document.add_class(element, class_name)?;
        }
        for class_name in &options.animation_classes {
            document.add_class(element, class_name)?;
        }
        for class_name in &options.classes_to_remove {
            document.remove_class(element, class_name)?;
        }
        apply_styles(document, element, &options.to_styles)?;

        let total = total_time(document, element)?;
        let total_ms = total.as_millis() as u64;
        tracing::debug!(
            %element,
            total_ms,
            classes = ?options.animation_classes,
            "css animation started"
        );

        let animation = Animation::new(document.clone(), element, self.options.animation_classes);
        let pending = animation.clone();
        self.scheduler.schedule(total, move || pending.complete());
        Ok(animation)
    }
}

fn apply_styles(
    document: &SharedDocument,
    element: NodeId,
    styles: &[(String, String)],
) -> Result<()> {
    for (name, value) in styles {
        document.set_style(element, &camel_case_to_dash_case(name), value)?;
    }
    Ok(())
}

/// Longest delay plus longest duration across the element's inline
/// transition and animation properties.
fn total_time(document: &SharedDocument, element: NodeId) -> Result<Duration> {
    let longest = |names: [&str; 2]| -> Result<u64> {
        let mut max = 0;
        for name in names {
            if let Some(value) = document.get_style(element, name)? {
                max = max.max(parse_duration_list(&value));
            }
        }
        Ok(max)
    };
    let delay = longest(["transition-delay", "animation-delay"])?;
    let duration = longest(["transition-duration", "animation-duration"])?;
    Ok(Duration::from_millis(delay.saturating_add(duration)))
}

/// Largest entry of a CSS time list such as `0.3s, 150ms`, in milliseconds.
/// Unparseable entries count as zero.
pub fn parse_duration_list(value: &str) -> u64 {
    value.split(',').map(parse_duration).max().unwrap_or(0)
}

fn parse_duration(value: &str) -> u64 {
    let value = value.trim();
    if let Some(ms) = value.strip_suffix("ms") {
        ms.trim().parse::<f64>().map(|v| v.max(0.0) as u64).unwrap_or(0)
    } else if let Some(secs) = value.strip_suffix('s') {
        secs.trim()
            .parse::<f64>()
            .map(|v| (v.max(0.0) * 1000.0).floor() as u64)
            .unwrap_or(0)
    } else {
        0
    }
}
