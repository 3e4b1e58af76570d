// Selection channels - Lock-free single-producer/single-consumer queues
// A full queue drops the message: delivery is at-most-once

use super::relay::DanceSelection;
use ringbuf::{HeapRb, traits::Split};

pub type SelectionProducer = ringbuf::HeapProd<DanceSelection>;
pub type SelectionConsumer = ringbuf::HeapCons<DanceSelection>;

pub fn create_selection_channel(capacity: usize) -> (SelectionProducer, SelectionConsumer) {
    let rb = HeapRb::<DanceSelection>::new(capacity.max(1));
    rb.split()
}
