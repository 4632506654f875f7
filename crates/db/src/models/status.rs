//! Status helper enums mapping to SMALLSERIAL lookup tables.
//!
//! Each enum variant's discriminant matches the seed data order (1-based)
//! in the corresponding `*_statuses` database table.

use catalog_core::import_status::{
    IMPORT_STATUS_FAILURE, IMPORT_STATUS_PENDING, IMPORT_STATUS_PROGRESS, IMPORT_STATUS_SUCCESS,
};

/// Status ID type matching SMALLINT/SMALLSERIAL in the database.
pub type StatusId = i16;

macro_rules! define_status_enum {
    (
        $(#[$meta:meta])*
        $name:ident {
            $( $(#[$vmeta:meta])* $variant:ident = $val:literal ),+ $(,)?
        }
    ) => {
        $(#[$meta])*
        #[repr(i16)]
        #[derive(Debug, Clone, Copy, PartialEq, Eq)]
        pub enum $name {
            $( $(#[$vmeta])* $variant = $val ),+
        }

        impl $name {
            /// Return the database status ID.
            pub fn id(self) -> StatusId {
                self as StatusId
            }

            /// Look up the variant for a database status ID.
            pub fn from_id(id: StatusId) -> Option<Self> {
                match id {
                    $( $val => Some($name::$variant), )+
                    _ => None,
                }
            }
        }

        impl From<$name> for StatusId {
            fn from(value: $name) -> Self {
                value as StatusId
            }
        }
    };
}

define_status_enum! {
    /// Lifecycle of a CSV import job.
    ImportJobStatus {
        Pending = 1,
        Progress = 2,
        Success = 3,
        Failure = 4,
    }
}

impl ImportJobStatus {
    /// Label reported to polling clients.
    pub fn label(self) -> &'static str {
        match self {
            ImportJobStatus::Pending => IMPORT_STATUS_PENDING,
            ImportJobStatus::Progress => IMPORT_STATUS_PROGRESS,
            ImportJobStatus::Success => IMPORT_STATUS_SUCCESS,
            ImportJobStatus::Failure => IMPORT_STATUS_FAILURE,
        }
    }

    /// Whether the job can no longer change state.
    pub fn is_terminal(self) -> bool {
        matches!(self, ImportJobStatus::Success | ImportJobStatus::Failure)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ids_round_trip() {
        for status in [
            ImportJobStatus::Pending,
            ImportJobStatus::Progress,
            ImportJobStatus::Success,
            ImportJobStatus::Failure,
        ] {
            assert_eq!(ImportJobStatus::from_id(status.id()), Some(status));
        }
        assert_eq!(ImportJobStatus::from_id(0), None);
        assert_eq!(ImportJobStatus::from_id(5), None);
    }

    #[test]
    fn labels_and_terminal_states() {
        assert_eq!(ImportJobStatus::Pending.label(), "PENDING");
        assert_eq!(ImportJobStatus::Failure.label(), "FAILURE");
        assert!(!ImportJobStatus::Progress.is_terminal());
        assert!(ImportJobStatus::Success.is_terminal());
    }
}
