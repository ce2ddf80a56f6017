mod helpers;
mod events_test;
mod order_test;
