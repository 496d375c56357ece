//! Endpoint binding: pipe allocation and opening for the selected interface.

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};
use usbh_hid_descriptor::{EndpointDescriptor, Interface, TransferType};

use crate::error::{HidClassError, HidClassResult};
use crate::host::{PipeConfig, PipeId, UsbHost};

/// Transfer direction of an endpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Direction {
    /// Device to host
    In,
    /// Host to device
    Out,
}

impl Direction {
    fn of(endpoint: &EndpointDescriptor) -> Self {
        if endpoint.is_in() { Self::In } else { Self::Out }
    }
}

/// An endpoint with an open pipe.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct EndpointBinding {
    /// `bEndpointAddress`
    pub address: u8,
    /// Direction from the address
    pub direction: Direction,
    /// Open pipe
    pub pipe: PipeId,
    /// `wMaxPacketSize`
    pub max_packet_size: u16,
    /// `bInterval` as advertised
    pub interval: u8,
}

/// The pipes bound for one interface.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BoundEndpoints {
    /// Interrupt IN endpoint
    pub in_endpoint: EndpointBinding,
    /// Optional interrupt OUT endpoint
    pub out_endpoint: Option<EndpointBinding>,
}

impl BoundEndpoints {
    /// Every bound endpoint, IN first.
    pub fn iter(&self) -> impl Iterator<Item = &EndpointBinding> {
        std::iter::once(&self.in_endpoint).chain(self.out_endpoint.as_ref())
    }
}

/// Open interrupt pipes for the endpoints of `interface`.
///
/// Looks at no more than `min(bNumEndpoints, max_endpoints)` endpoint
/// descriptors. The first IN and first OUT endpoint are bound; further
/// endpoints of the same direction are ignored. On failure every pipe
/// allocated so far is closed and freed before the error is returned.
///
/// # Errors
///
/// [`HidClassError::PipeAlloc`] / [`HidClassError::PipeOpen`] from the
/// transport, or [`HidClassError::MissingInEndpoint`] when no IN endpoint
/// was found.
pub fn bind_endpoints(
    host: &mut dyn UsbHost,
    index: u8,
    interface: &Interface,
    max_endpoints: u8,
) -> HidClassResult<BoundEndpoints> {
    let declared = interface.descriptor.num_endpoints;
    let limit = usize::from(declared.min(max_endpoints));
    if usize::from(declared) > limit {
        debug!(
            "Interface {} declares {} endpoints, binding at most {}",
            index, declared, limit
        );
    }

    let mut in_endpoint: Option<EndpointBinding> = None;
    let mut out_endpoint: Option<EndpointBinding> = None;

    for endpoint in interface.endpoints.iter().take(limit) {
        let direction = Direction::of(endpoint);
        let slot = match direction {
            Direction::In => &mut in_endpoint,
            Direction::Out => &mut out_endpoint,
        };
        if slot.is_some() {
            debug!(
                "Ignoring extra {:?} endpoint {:#04x} on interface {}",
                direction, endpoint.address, index
            );
            continue;
        }

        match open_endpoint(host, endpoint, direction) {
            Ok(binding) => *slot = Some(binding),
            Err(e) => {
                for bound in in_endpoint.iter().chain(out_endpoint.iter()) {
                    release_pipe(host, bound.pipe);
                }
                return Err(e);
            }
        }
    }

    let Some(in_endpoint) = in_endpoint else {
        if let Some(out) = out_endpoint {
            release_pipe(host, out.pipe);
        }
        return Err(HidClassError::MissingInEndpoint { interface: index });
    };

    Ok(BoundEndpoints {
        in_endpoint,
        out_endpoint,
    })
}

fn open_endpoint(
    host: &mut dyn UsbHost,
    endpoint: &EndpointDescriptor,
    direction: Direction,
) -> HidClassResult<EndpointBinding> {
    let pipe = host
        .alloc_pipe(endpoint.address)
        .map_err(|source| HidClassError::PipeAlloc {
            endpoint: endpoint.address,
            source,
        })?;

    let config = PipeConfig {
        endpoint_address: endpoint.address,
        device_address: host.device_address(),
        speed: host.speed(),
        transfer_type: TransferType::Interrupt,
        max_packet_size: endpoint.max_packet_size,
    };
    if let Err(source) = host.open_pipe(pipe, &config) {
        if let Err(e) = host.free_pipe(pipe) {
            warn!("Failed to free pipe {:?} after open failure: {}", pipe, e);
        }
        return Err(HidClassError::PipeOpen {
            endpoint: endpoint.address,
            source,
        });
    }

    if let Err(e) = host.set_toggle(pipe, 0) {
        warn!("Failed to reset data toggle on pipe {:?}: {}", pipe, e);
    }

    debug!(
        "Bound {:?} endpoint {:#04x} to pipe {:?} (mps {})",
        direction, endpoint.address, pipe, endpoint.max_packet_size
    );

    Ok(EndpointBinding {
        address: endpoint.address,
        direction,
        pipe,
        max_packet_size: endpoint.max_packet_size,
        interval: endpoint.interval,
    })
}

/// Close and free a pipe, logging transport failures.
pub(crate) fn release_pipe(host: &mut dyn UsbHost, pipe: PipeId) {
    if let Err(e) = host.close_pipe(pipe) {
        warn!("Failed to close pipe {:?}: {}", pipe, e);
    }
    if let Err(e) = host.free_pipe(pipe) {
        warn!("Failed to free pipe {:?}: {}", pipe, e);
    }
}
