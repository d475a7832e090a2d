mod character;
mod sync_status;
