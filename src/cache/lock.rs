use std::sync::{LockResult, RwLock, RwLockReadGuard, RwLockWriteGuard};

use tracing::warn;

/// Take the guard even if a panicking writer poisoned the lock.
fn recover<G>(result: LockResult<G>, op: &'static str, lock_kind: &'static str) -> G {
    result.unwrap_or_else(|poisoned| {
        warn!(
            target = "jdigital::cache::lock",
            op,
            lock_kind,
            result = "poisoned_recovered",
            "recovered from poisoned cache lock; cached entries may be stale"
        );
        poisoned.into_inner()
    })
}

pub(crate) fn rw_read<'a, T>(lock: &'a RwLock<T>, op: &'static str) -> RwLockReadGuard<'a, T> {
    recover(lock.read(), op, "rwlock.read")
}

pub(crate) fn rw_write<'a, T>(lock: &'a RwLock<T>, op: &'static str) -> RwLockWriteGuard<'a, T> {
    recover(lock.write(), op, "rwlock.write")
}

#[cfg(test)]
mod tests {
    use std::panic::{AssertUnwindSafe, catch_unwind};

    use super::*;

    #[test]
    fn poisoned_lock_is_still_usable() {
        let lock = RwLock::new(1);
        let _ = catch_unwind(AssertUnwindSafe(|| {
            let _guard = lock.write().unwrap();
            panic!("poison");
        }));
        assert!(lock.is_poisoned());

        *rw_write(&lock, "test") += 1;
        assert_eq!(*rw_read(&lock, "test"), 2);
    }
}
