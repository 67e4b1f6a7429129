//! Runtime allocation and codec benchmarks

use std::ffi::CStr;
use std::ptr::NonNull;

use criterion::{black_box, criterion_group, criterion_main, BatchSize, Criterion};

use ironbark_rts::host::{RawAllocator, TextBridge, TrapSink};
use ironbark_rts::idl::leb128::{leb128_encode, sleb128_encode, MAX_ENCODED_SIZE};
use ironbark_rts::memory::layout::{Blob, ManagedPtr, Obj, BLOB_HEADER_SIZE, TAG_BLOB};
use ironbark_rts::memory::region::Region;
use ironbark_rts::memory::units::Bytes;
use ironbark_rts::runtime::Runtime;

struct BenchHost {
    region: Region,
}

impl BenchHost {
    fn new() -> Self {
        BenchHost {
            region: Region::new(),
        }
    }
}

impl RawAllocator for BenchHost {
    fn alloc_bytes(&self, n: Bytes) -> NonNull<u8> {
        self.region.alloc_bytes(n)
    }
}

impl TrapSink for BenchHost {
    fn trap(&self, msg: &[u8]) -> ! {
        panic!("{}", String::from_utf8_lossy(msg))
    }
}

impl TextBridge for BenchHost {
    fn text_of_cstr(&self, text: &CStr) -> ManagedPtr {
        let bytes = text.to_bytes();
        let n = Bytes(bytes.len() as u32);
        let raw = self.alloc_bytes(BLOB_HEADER_SIZE.to_bytes() + n);
        let blob = raw.as_ptr() as *mut Blob;
        unsafe {
            (*blob).header.tag = TAG_BLOB;
            (*blob).len = n;
            std::ptr::copy_nonoverlapping(bytes.as_ptr(), Blob::payload_addr(blob), bytes.len());
            ManagedPtr::new(NonNull::new_unchecked(blob as *mut Obj))
        }
    }
}

fn blob_allocation(c: &mut Criterion) {
    c.bench_function("alloc 1000 x 64-byte blobs", |b| {
        b.iter_batched(
            BenchHost::new,
            |host| {
                let rt = Runtime::new(&host);
                for _ in 0..1000 {
                    black_box(rt.alloc_blob(Bytes(64)));
                }
            },
            BatchSize::SmallInput,
        )
    });
}

fn array_allocation(c: &mut Criterion) {
    c.bench_function("alloc 1000 x 16-slot arrays", |b| {
        b.iter_batched(
            BenchHost::new,
            |host| {
                let rt = Runtime::new(&host);
                for _ in 0..1000 {
                    black_box(rt.alloc_array(16));
                }
            },
            BatchSize::SmallInput,
        )
    });
}

fn codec(c: &mut Criterion) {
    c.bench_function("leb128 encode sweep", |b| {
        b.iter(|| {
            let mut buf = [0u8; MAX_ENCODED_SIZE];
            for bit in 0..32 {
                leb128_encode(black_box(1u32 << bit), &mut buf);
                black_box(&buf);
            }
        })
    });

    c.bench_function("sleb128 encode sweep", |b| {
        b.iter(|| {
            let mut buf = [0u8; MAX_ENCODED_SIZE];
            for bit in 0..31 {
                sleb128_encode(black_box(-(1i32 << bit)), &mut buf);
                black_box(&buf);
            }
        })
    });
}

criterion_group!(benches, blob_allocation, array_allocation, codec);
criterion_main!(benches);
