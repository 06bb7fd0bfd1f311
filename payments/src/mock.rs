// autorent
// Copyright 2026 The autorent Authors
//
// Licensed under the Apache License, Version 2.0 (the "License"); you may not
// use this file except in compliance with the License.  You may obtain a copy
// of the License at:
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS, WITHOUT
// WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.  See the
// License for the specific language governing permissions and limitations
// under the License.

//! Payment gateway backed by in-memory state for testing purposes.

use crate::{CheckoutRequest, CheckoutSession, PaymentGateway, PaymentsResult};
use async_trait::async_trait;
use futures::lock::Mutex;
use std::io;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// Payment gateway that records every checkout request and hands out sequential session IDs.
#[derive(Clone, Default)]
pub struct MockGateway {
    /// All checkout requests received so far, in order.
    requests: Arc<Mutex<Vec<CheckoutRequest>>>,

    /// Whether the next requests should fail as if the processor was down.
    fail: Arc<AtomicBool>,
}

impl MockGateway {
    /// Makes all subsequent checkout requests fail (or succeed again if `fail` is false).
    pub fn set_fail(&self, fail: bool) {
        self.fail.store(fail, Ordering::SeqCst);
    }

    /// Returns a copy of all checkout requests received so far.
    pub async fn requests(&self) -> Vec<CheckoutRequest> {
        self.requests.lock().await.clone()
    }
}

#[async_trait]
impl PaymentGateway for MockGateway {
    async fn create_checkout(&self, request: &CheckoutRequest) -> PaymentsResult<CheckoutSession> {
        if self.fail.load(Ordering::SeqCst) {
            return Err(io::Error::new(io::ErrorKind::ConnectionRefused, "Processor is down"));
        }

        let mut requests = self.requests.lock().await;
        requests.push(request.clone());
        let n = requests.len();
        Ok(CheckoutSession {
            external_id: format!("cs_test_{}", n),
            url: format!("https://checkout.example.com/pay/cs_test_{}", n),
        })
    }
}
