/// Errores que terminan el loop del worker.
/// Los fallos de una tarea Map/Reduce no están acá: se reportan al
/// coordinador y el loop sigue.
pub enum WorkerError {
    /// No se pudo hablar con el coordinador. El worker no reintenta: si tenía
    /// una tarea, el timeout del coordinador la va a reasignar.
    ConnectionLost {
        call: &'static str,
        source: Box<dyn std::error::Error + Send + Sync>,
    },
    /// El coordinador contestó algo que no esperábamos
    Rejected { call: &'static str, status: u16 },
}

impl WorkerError {
    pub fn connection_lost(
        call: &'static str,
        source: impl Into<Box<dyn std::error::Error + Send + Sync>>,
    ) -> Self {
        WorkerError::ConnectionLost {
            call,
            source: source.into(),
        }
    }

    pub fn is_connection_lost(&self) -> bool {
        matches!(self, WorkerError::ConnectionLost { .. })
    }
}

impl std::fmt::Display for WorkerError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            WorkerError::ConnectionLost { call, .. } => {
                write!(f, "se perdió la conexión con el coordinador en {call}")
            }
            WorkerError::Rejected { call, status } => {
                write!(f, "el coordinador rechazó {call} con status {status}")
            }
        }
    }
}

impl std::error::Error for WorkerError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            WorkerError::ConnectionLost { source, .. } => Some(source.as_ref()),
            WorkerError::Rejected { .. } => None,
        }
    }
}

impl std::fmt::Debug for WorkerError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        error_chain_fmt(f, self)
    }
}

pub fn error_chain_fmt(
    f: &mut std::fmt::Formatter<'_>,
    e: &impl std::error::Error,
) -> std::fmt::Result {
    writeln!(f, "{}\n", e)?;
    let mut current = e.source();
    while let Some(cause) = current {
        writeln!(f, "Caused by:\n\t{}", cause)?;
        current = cause.source();
    }
    Ok(())
}
