//! Declarative macros to reduce boilerplate across the smuctl codebase

/// Define a metric enum with automatic `name()` and `all()` implementations
///
/// # Example
/// ```
/// use smuctl::metric_enum;
///
/// metric_enum! {
///     pub enum MailboxMetric {
///         Version => "smu_version",
///         Prochot => "smu_prochot",
///     }
/// }
///
/// let metric = MailboxMetric::Prochot;
/// assert_eq!(metric.name(), "smu_prochot");
/// assert_eq!(MailboxMetric::all().len(), 2);
/// ```
#[macro_export]
macro_rules! metric_enum {
    (
        $(#[$meta:meta])*
        $vis:vis enum $name:ident {
            $($variant:ident => $str:literal),* $(,)?
        }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
        $vis enum $name {
            $($variant,)*
        }

        impl $name {
            pub fn name(&self) -> &'static str {
                match self {
                    $($name::$variant => $str,)*
                }
            }

            pub fn all() -> Vec<$name> {
                vec![$($name::$variant,)*]
            }
        }
    };
}

/// Encode every metric family of an exporter's registry into a buffer
///
/// # Example
/// ```ignore
/// // In main.rs metrics handler
/// let mut buffer = Vec::new();
/// gather_metrics!(buffer, encoder, state.exporter, "SMU");
/// ```
#[macro_export]
macro_rules! gather_metrics {
    ($buffer:expr, $encoder:expr, $exporter:expr, $name:literal) => {
        let metric_families = $exporter.registry().gather();
        if let Err(e) = $encoder.encode(&metric_families, &mut $buffer) {
            tracing::error!(concat!("Failed to encode ", $name, " metrics: {}"), e);
        }
    };
}

/// Define an enum with name() and all() methods, plus custom data per variant
///
/// # Example
/// ```
/// use smuctl::enum_with_data;
///
/// enum_with_data! {
///     pub enum Socket: &'static str {
///         Am4 => ("AM4", "desktop"),
///         Sp3 => ("SP3", "server"),
///     }
///     impl segment -> &'static str
/// }
///
/// assert_eq!(Socket::Sp3.name(), "SP3");
/// assert_eq!(Socket::Am4.segment(), "desktop");
/// ```
#[macro_export]
macro_rules! enum_with_data {
    (
        $(#[$meta:meta])*
        $vis:vis enum $name:ident: $data_type:ty {
            $($variant:ident => ($str:literal, $data:expr)),* $(,)?
        }
        impl $method:ident -> $return_type:ty
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
        $vis enum $name {
            $($variant,)*
        }

        impl $name {
            pub fn name(&self) -> &'static str {
                match self {
                    $($name::$variant => $str,)*
                }
            }

            pub fn $method(&self) -> $return_type {
                match self {
                    $($name::$variant => $data,)*
                }
            }

            pub fn all() -> Vec<$name> {
                vec![$($name::$variant,)*]
            }
        }
    };
}
