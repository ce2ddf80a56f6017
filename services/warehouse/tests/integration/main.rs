mod helpers;
mod events_test;
mod inventory_test;
