// src/common/status.rs

/// Máquina de estados simples: cada status conhece seus sucessores permitidos.
pub trait StatusFlow: Copy + PartialEq + 'static {
    fn as_str(&self) -> &'static str;

    fn next_allowed(&self) -> &'static [Self];

    fn can_transition_to(&self, next: Self) -> bool {
        *self != next && self.next_allowed().contains(&next)
    }

    fn is_terminal(&self) -> bool {
        self.next_allowed().is_empty()
    }
}

/// Gera `as_str` e a tabela de transições a partir de uma lista declarativa.
///
/// ```ignore
/// status_flow!(VisitStatus {
///     Pending => "pending" => [Confirmed, Cancelled],
///     Confirmed => "confirmed" => [Completed, Cancelled],
///     ...
/// });
/// ```
#[macro_export]
macro_rules! status_flow {
    ($ty:ident { $($variant:ident => $label:literal => [$($next:ident),* $(,)?]),+ $(,)? }) => {
        impl $crate::common::status::StatusFlow for $ty {
            fn as_str(&self) -> &'static str {
                match self {
                    $($ty::$variant => $label,)+
                }
            }

            fn next_allowed(&self) -> &'static [Self] {
                match self {
                    $($ty::$variant => &[$($ty::$next),*],)+
                }
            }
        }
    };
}
