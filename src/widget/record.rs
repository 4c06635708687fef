//! Record composition.
//!
//! A record widget is declared once with [`record_widget!`](crate::record_widget)
//! from an ordered field list. The macro generates the data struct, the
//! state struct, the action enum and the widget, so the field set of all
//! four can never drift apart.

use std::fmt;

use serde::{Deserialize, Serialize};

use super::validation::ValidationError;

/// Record-level action that fills several fields at once.
///
/// Used when picking one value implies others, e.g. selecting a rate copies
/// its ratios into sibling fields. Implementations only move data around;
/// they never look anything up.
pub trait DeriveFields<D> {
    /// Names of the fields `apply` overwrites.
    fn fields(&self) -> &'static [&'static str];

    fn apply(self, data: D) -> D;
}

/// Derivation for records that have none.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct NoDerive;

impl<D> DeriveFields<D> for NoDerive {
    fn fields(&self) -> &'static [&'static str] {
        &[]
    }

    fn apply(self, data: D) -> D {
        data
    }
}

/// Declarative knobs of a record widget.
pub struct RecordOptions<D> {
    pub label: Option<String>,
    read_only: Vec<&'static str>,
    retain: Option<fn(&D, &ValidationError) -> bool>,
}

impl<D> Default for RecordOptions<D> {
    fn default() -> Self {
        Self {
            label: None,
            read_only: Vec::new(),
            retain: None,
        }
    }
}

impl<D> Clone for RecordOptions<D> {
    fn clone(&self) -> Self {
        Self {
            label: self.label.clone(),
            read_only: self.read_only.clone(),
            retain: self.retain,
        }
    }
}

impl<D> fmt::Debug for RecordOptions<D> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RecordOptions")
            .field("label", &self.label)
            .field("read_only", &self.read_only)
            .field("filtered", &self.retain.is_some())
            .finish()
    }
}

impl<D> RecordOptions<D> {
    pub fn set_label(&mut self, label: String) {
        self.label = Some(label);
    }

    pub fn add_read_only(&mut self, field: &'static str) {
        if !self.read_only.contains(&field) {
            self.read_only.push(field);
        }
    }

    pub fn is_read_only(&self, field: &str) -> bool {
        self.read_only.contains(&field)
    }

    pub fn set_filter(&mut self, retain: fn(&D, &ValidationError) -> bool) {
        self.retain = Some(retain);
    }

    /// Drops errors the record deems irrelevant for `data`'s current mode.
    pub fn filter_errors(&self, data: &D, errors: Vec<ValidationError>) -> Vec<ValidationError> {
        match self.retain {
            Some(retain) => errors
                .into_iter()
                .filter(|error| retain(data, error))
                .collect(),
            None => errors,
        }
    }
}

/// Declares a record, its widget, state and action types.
///
/// ```ignore
/// record_widget! {
///     #[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
///     pub struct Contact {
///         name: String => Name(TextWidget),
///         age: f64 => Age(NumberWidget),
///     }
///
///     pub widget ContactWidget {
///         state: ContactState,
///         action: ContactAction,
///         derive: NoDerive,
///     }
/// }
/// ```
///
/// Fields are initialized in declaration order; each child sees the record
/// as initialized so far through its [`Scope`](crate::widget::Scope). A
/// field's value is moved out of the record while its child runs, so the
/// scope shows that one field at its default and the child must read its own
/// value from `data`. The data struct must derive `Clone`, `PartialEq` and
/// `Debug`; field types and child states must implement `Default`; child
/// actions and the derive type must be `Clone`, `PartialEq` and
/// serde-serializable.
/// Action variants serialize as snake_case field tags. `derive` is reserved:
/// the generated action always carries a `Derive` variant, so no field may
/// use `Derive` as its tag.
#[macro_export]
macro_rules! record_widget {
    (
        $(#[$data_meta:meta])*
        $vis:vis struct $data:ident {
            $(
                $(#[$field_meta:meta])*
                $field:ident : $field_ty:ty => $tag:ident($child:ty)
            ),+ $(,)?
        }

        $(#[$widget_meta:meta])*
        $wvis:vis widget $widget:ident {
            state: $state:ident,
            action: $action:ident,
            derive: $derive:ty $(,)?
        }
    ) => {
        $(#[$data_meta])*
        $vis struct $data {
            $(
                $(#[$field_meta])*
                pub $field: $field_ty,
            )+
        }

        /// Per-field editing state plus the parameters it was initialized with.
        #[derive(Debug, Clone, PartialEq, Default)]
        $wvis struct $state {
            $( pub $field: <$child as $crate::widget::Widget>::State, )+
            pub init: $crate::widget::InitParams,
        }

        #[derive(Debug, Clone, PartialEq, ::serde::Serialize, ::serde::Deserialize)]
        #[serde(rename_all = "snake_case")]
        $wvis enum $action {
            $( $tag(<$child as $crate::widget::Widget>::Action), )+
            Derive($derive),
        }

        $(#[$widget_meta])*
        $wvis struct $widget {
            $( pub $field: $child, )+
            pub options: $crate::widget::RecordOptions<$data>,
        }

        impl $widget {
            pub const FIELDS: &'static [&'static str] = &[$(stringify!($field)),+];

            #[allow(clippy::too_many_arguments)]
            pub fn new($($field: $child),+) -> Self {
                Self {
                    $($field,)+
                    options: $crate::widget::RecordOptions::default(),
                }
            }

            pub fn label(mut self, label: impl Into<String>) -> Self {
                self.options.set_label(label.into());
                self
            }

            /// Disables editing of `field` regardless of the parent's status.
            pub fn read_only(mut self, field: &'static str) -> Self {
                debug_assert!(
                    Self::FIELDS.contains(&field),
                    "unknown field `{}` for {}",
                    field,
                    stringify!($widget)
                );
                self.options.add_read_only(field);
                self
            }

            /// Keeps only the errors `retain` accepts for the current data.
            pub fn retain_errors(
                mut self,
                retain: fn(&$data, &$crate::widget::ValidationError) -> bool,
            ) -> Self {
                self.options.set_filter(retain);
                self
            }
        }

        impl $crate::widget::Widget for $widget {
            type Data = $data;
            type State = $state;
            type Action = $action;

            fn validate(
                &self,
                data: &$data,
                cache: &dyn $crate::cache::RecordLookup,
            ) -> ::std::vec::Vec<$crate::widget::ValidationError> {
                let mut errors = ::std::vec::Vec::new();
                $(
                    errors.extend($crate::widget::prefix_errors(
                        stringify!($field),
                        $crate::widget::Widget::validate(&self.$field, &data.$field, cache),
                    ));
                )+
                self.options.filter_errors(data, errors)
            }
        }

        impl<Ctx: ?Sized> $crate::widget::Editor<Ctx> for $widget
        where
            $( $child: for<'s> $crate::widget::Editor<$crate::widget::Scope<'s, $data, Ctx>>, )+
        {
            fn initialize(
                &self,
                data: $data,
                ctx: &Ctx,
                params: &$crate::widget::InitParams,
            ) -> $crate::widget::Snapshot<$state, $data> {
                let mut data = data;
                $(
                    let $field = {
                        let value = ::std::mem::take(&mut data.$field);
                        let next = $crate::widget::Editor::initialize(
                            &self.$field,
                            value,
                            &$crate::widget::Scope::new(&data, ctx),
                            params,
                        );
                        data.$field = next.data;
                        next.state
                    };
                )+
                $crate::widget::Snapshot::new(
                    $state {
                        $($field,)+
                        init: *params,
                    },
                    data,
                )
            }

            fn reduce(
                &self,
                state: $state,
                data: $data,
                action: $action,
                ctx: &Ctx,
            ) -> $crate::widget::Snapshot<$state, $data> {
                let mut state = state;
                let mut data = data;
                match action {
                    $(
                        $action::$tag(action) => {
                            let value = ::std::mem::take(&mut data.$field);
                            let next = $crate::widget::Editor::reduce(
                                &self.$field,
                                state.$field,
                                value,
                                action,
                                &$crate::widget::Scope::new(&data, ctx),
                            );
                            state.$field = next.state;
                            data.$field = next.data;
                        }
                    )+
                    $action::Derive(derive) => {
                        let touched =
                            <$derive as $crate::widget::DeriveFields<$data>>::fields(&derive);
                        data = <$derive as $crate::widget::DeriveFields<$data>>::apply(derive, data);
                        $(
                            if touched.contains(&stringify!($field)) {
                                let value = ::std::mem::take(&mut data.$field);
                                let next = $crate::widget::Editor::initialize(
                                    &self.$field,
                                    value,
                                    &$crate::widget::Scope::new(&data, ctx),
                                    &$crate::widget::InitParams::load(),
                                );
                                state.$field = next.state;
                                data.$field = next.data;
                            }
                        )+
                    }
                }
                $crate::widget::Snapshot::new(state, data)
            }

            fn render(
                &self,
                props: $crate::widget::RenderProps<'_, Self, Ctx>,
            ) -> $crate::widget::View {
                let mut fields = ::std::vec::Vec::new();
                $(
                    {
                        let status = props.status.field(
                            stringify!($field),
                            self.options.is_read_only(stringify!($field)),
                        );
                        let scope = $crate::widget::Scope::new(props.data, props.ctx);
                        let view = $crate::widget::Editor::render(
                            &self.$field,
                            $crate::widget::RenderProps {
                                state: &props.state.$field,
                                data: &props.data.$field,
                                ctx: &scope,
                                status: &status,
                                dispatch: props.dispatch.map($action::$tag),
                                cache: props.cache,
                            },
                        );
                        fields.push((stringify!($field).to_string(), view));
                    }
                )+
                $crate::widget::View::Group($crate::widget::GroupView {
                    label: self.options.label.clone(),
                    fields,
                    highlighted: props.status.is_highlighted(),
                    messages: props.status.messages(),
                })
            }
        }
    };
}
