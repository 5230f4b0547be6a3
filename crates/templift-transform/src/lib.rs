//! AngularJS to Angular template upgrades.
//!
//! This crate provides the rewrite pipeline that turns AngularJS directive
//! templates (`ng-if`, `ng-repeat`, `$ctrl.` expressions) into Angular
//! template syntax (`*ngIf`, `*ngFor`, controller-free bindings).

pub mod expression;
pub mod interpolation;
pub mod mapping;
pub mod pipeline;
pub mod walker;

pub use expression::{negate_expression, strip_controller_prefix, transform_repeat_expression};
pub use interpolation::{has_interpolation, rewrite_value};
pub use mapping::{map_attribute, resolve, AttributeRule, NG_ATTR_PREFIX};
pub use pipeline::{
    locate_body, normalize_template, remove_ctrl_references, upgrade_attribute_names,
    upgrade_template, UpgradeError, UpgradeOptions, DEFAULT_CONTROLLER_VAR,
};
pub use walker::{map_element, map_element_nodes};
