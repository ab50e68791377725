mod box_reset;
mod box_update;
mod box_verify;
