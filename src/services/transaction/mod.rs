pub mod events;

pub use events::sum_transfer_values;
