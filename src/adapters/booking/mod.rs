//! Booking adapters.

mod stub_booking_gateway;

pub use stub_booking_gateway::StubBookingGateway;
