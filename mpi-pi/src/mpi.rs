//! MPI-based implementation of CommGroup.
use crate::{check_rank, CommGroup, DataType, Error, Result};
use lazy_static::lazy_static;
use mpi_sys::{
    MPI_Comm, MPI_Comm_rank, MPI_Comm_size, MPI_Finalize, MPI_Get_count, MPI_Get_processor_name,
    MPI_Init_thread, MPI_Iprobe, MPI_Irecv, MPI_Isend, MPI_Request, MPI_Test, RSMPI_COMM_WORLD,
    RSMPI_STATUS_IGNORE, RSMPI_THREAD_FUNNELED, RSMPI_UINT8_T,
};
use std::future::Future;
use std::mem::MaybeUninit;
use std::os::raw::{c_char, c_int};
use std::pin::Pin;
use std::sync::Mutex;
use tracing::{debug, warn};

// Upper bound of MPI_MAX_PROCESSOR_NAME across common implementations.
const MAX_PROCESSOR_NAME: usize = 256;

lazy_static! {
    static ref MPI_INIT_LOCK: Mutex<bool> = Mutex::new(false);
}

/// Join the MPI world communicator.
///
/// Only one group may be live per process; dropping it finalizes MPI.
pub fn init_standard_mpi() -> Result<MPICommGroup> {
    let mut initialized = MPI_INIT_LOCK
        .lock()
        .map_err(|_| Error::Init("MPI init lock poisoned".to_string()))?;
    if *initialized {
        return Err(Error::AlreadyInitialized);
    }
    unsafe {
        let mut provided: c_int = 0;
        let code = MPI_Init_thread(
            std::ptr::null_mut(),
            std::ptr::null_mut(),
            RSMPI_THREAD_FUNNELED,
            &mut provided,
        );
        if code != 0 {
            return Err(Error::Init(format!("MPI_Init_thread returned {}", code)));
        }
        if provided < RSMPI_THREAD_FUNNELED {
            MPI_Finalize();
            return Err(Error::Init(format!(
                "MPI library provides threading level {}, need {}",
                provided, RSMPI_THREAD_FUNNELED
            )));
        }
        *initialized = true;
        // Released before the group exists, its Drop takes the lock again.
        drop(initialized);

        let comm = RSMPI_COMM_WORLD;
        // Build the group before querying so a failed query still finalizes.
        let mut group = MPICommGroup {
            comm,
            rank: 0,
            size: 0,
            processor_name: String::new(),
        };
        let mut rank = 0;
        Error::check(MPI_Comm_rank(comm, &mut rank))?;
        let mut size = 0;
        Error::check(MPI_Comm_size(comm, &mut size))?;
        group.rank = rank.try_into().map_err(|_| Error::Mpi(rank))?;
        group.size = size.try_into().map_err(|_| Error::Mpi(size))?;
        group.processor_name = processor_name()?;
        debug!(rank = group.rank, size = group.size, "joined MPI world");
        Ok(group)
    }
}

unsafe fn processor_name() -> Result<String> {
    let mut buffer = vec![0 as c_char; MAX_PROCESSOR_NAME];
    let mut len: c_int = 0;
    Error::check(MPI_Get_processor_name(buffer.as_mut_ptr(), &mut len))?;
    let len = usize::try_from(len).unwrap_or(0).min(MAX_PROCESSOR_NAME);
    let bytes: Vec<u8> = buffer[..len].iter().map(|&c| c as u8).collect();
    Ok(String::from_utf8_lossy(&bytes).into_owned())
}

impl Drop for MPICommGroup {
    fn drop(&mut self) {
        unsafe {
            let code = MPI_Finalize();
            if code != 0 {
                warn!(code, "MPI_Finalize failed");
            }
        }
        if let Ok(mut initialized) = MPI_INIT_LOCK.lock() {
            *initialized = false;
        }
    }
}

pub struct MPICommGroup {
    comm: MPI_Comm,
    rank: u32,
    size: u32,
    processor_name: String,
}

impl CommGroup for MPICommGroup {
    fn rank(&self) -> u32 {
        self.rank
    }

    fn size(&self) -> u32 {
        self.size
    }

    fn processor_name(&self) -> String {
        self.processor_name.clone()
    }

    fn send<T: DataType>(
        &self,
        data: &T,
        dest: u32,
        tag: u32,
    ) -> Pin<Box<dyn Future<Output = Result<()>>>> {
        let comm = self.comm;
        let encoded = check_rank(dest, self.size)
            .and_then(|_| bincode::serialize(data).map_err(Error::from));
        Box::pin(async move {
            let buffer = encoded?;
            internal_send(comm, &buffer, dest, tag).await
        })
    }

    fn recv<T: DataType>(&self, source: u32, tag: u32) -> Pin<Box<dyn Future<Output = Result<T>>>> {
        let comm = self.comm;
        let valid = check_rank(source, self.size);
        Box::pin(async move {
            valid?;
            let buffer = internal_recv(comm, source, tag).await?;
            Ok::<T, Error>(bincode::deserialize(&buffer[..])?)
        })
    }
}

fn to_c_int(value: usize) -> Result<c_int> {
    value
        .try_into()
        .map_err(|_| Error::Init(format!("{} does not fit in a C int", value)))
}

async fn internal_send(comm: MPI_Comm, buffer: &[u8], dest: u32, tag: u32) -> Result<()> {
    let count = to_c_int(buffer.len())?;
    let dest = to_c_int(dest as usize)?;
    let tag = to_c_int(tag as usize)?;
    unsafe {
        let mut req = MaybeUninit::uninit();
        Error::check(MPI_Isend(
            buffer.as_ptr() as *const _,
            count,
            RSMPI_UINT8_T,
            dest,
            tag,
            comm,
            req.as_mut_ptr(),
        ))?;
        let mut req = req.assume_init();

        while !test_request(&mut req).await? {}
    }
    Ok(())
}

async fn internal_recv(comm: MPI_Comm, source: u32, tag: u32) -> Result<Vec<u8>> {
    let source = to_c_int(source as usize)?;
    let tag = to_c_int(tag as usize)?;
    unsafe {
        let mut buffer = vec![];

        loop {
            if let Some(count) = probe_recv(comm, source, tag).await? {
                buffer.resize(count, 0);
                break;
            }
        }

        let mut req = MaybeUninit::uninit();
        Error::check(MPI_Irecv(
            buffer.as_mut_ptr() as *mut _,
            to_c_int(buffer.len())?,
            RSMPI_UINT8_T,
            source,
            tag,
            comm,
            req.as_mut_ptr(),
        ))?;
        let mut req = req.assume_init();

        while !test_request(&mut req).await? {}
        Ok(buffer)
    }
}

/// Probe for a receive message.
async unsafe fn probe_recv(comm: MPI_Comm, source: c_int, tag: c_int) -> Result<Option<usize>> {
    let mut status = MaybeUninit::uninit();
    let mut flag = 0;
    Error::check(MPI_Iprobe(source, tag, comm, &mut flag, status.as_mut_ptr()))?;
    if flag != 0 {
        let status = status.assume_init();
        let mut count = 0;
        Error::check(MPI_Get_count(&status, RSMPI_UINT8_T, &mut count))?;
        Ok(Some(count.try_into().map_err(|_| Error::Mpi(count))?))
    } else {
        Ok(None)
    }
}

/// Test if the request is complete.
async unsafe fn test_request(req: &mut MPI_Request) -> Result<bool> {
    let mut flag = 0;
    Error::check(MPI_Test(req, &mut flag, RSMPI_STATUS_IGNORE))?;
    Ok(flag != 0)
}
